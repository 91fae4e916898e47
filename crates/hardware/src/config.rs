//! Configuration system for the functional-unit models.
//!
//! This module defines the structures used to parameterize the units. It provides:
//! 1. **Defaults:** Baseline latencies and divider throughput.
//! 2. **Structures:** One section per unit plus a root [`Config`].
//! 3. **Validation:** Range checks reported as [`ConfigError`].
//!
//! Configuration is supplied as JSON (every field optional) or built with
//! `Config::default()`.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants.
mod defaults {
    /// Adder / compare / classify / reduce latency in cycles.
    pub const ADDER_LATENCY: u64 = 2;

    /// Fused multiply-add latency in cycles.
    pub const FMA_LATENCY: u64 = 4;

    /// Largest latency accepted for either floating-point unit.
    pub const MAX_FP_LATENCY: u64 = 8;

    /// Quotient bits retired per divider iteration (radix 4).
    pub const DIV_BITS_PER_CYCLE: u32 = 2;

    /// Fixed divider overhead: operand preparation plus sign fix-up.
    pub const DIV_OVERHEAD_CYCLES: u32 = 2;
}

/// Errors produced while loading or validating a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field is outside its allowed range.
    #[error("{field} = {value} is out of range ({allowed})")]
    OutOfRange {
        /// Dotted field path.
        field: &'static str,
        /// Offending value.
        value: u64,
        /// Human-readable allowed range.
        allowed: &'static str,
    },
}

/// Floating-point adder settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AdderConfig {
    /// Cycles from issue to result-valid.
    #[serde(default = "AdderConfig::default_latency")]
    pub latency: u64,
}

impl AdderConfig {
    /// Returns the default adder latency.
    fn default_latency() -> u64 {
        defaults::ADDER_LATENCY
    }
}

impl Default for AdderConfig {
    fn default() -> Self {
        Self {
            latency: defaults::ADDER_LATENCY,
        }
    }
}

/// Fused multiply-add settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FmaConfig {
    /// Cycles from issue to result-valid.
    #[serde(default = "FmaConfig::default_latency")]
    pub latency: u64,
}

impl FmaConfig {
    /// Returns the default FMA latency.
    fn default_latency() -> u64 {
        defaults::FMA_LATENCY
    }
}

impl Default for FmaConfig {
    fn default() -> Self {
        Self {
            latency: defaults::FMA_LATENCY,
        }
    }
}

/// Integer divider settings.
///
/// A request of element width `w` stays busy for
/// `ceil(w / bits_per_cycle) + overhead_cycles` cycles.
#[derive(Debug, Clone, Deserialize)]
pub struct DividerConfig {
    /// Quotient bits produced per cycle in every lane (1, 2, 4 or 8).
    #[serde(default = "DividerConfig::default_bits_per_cycle")]
    pub bits_per_cycle: u32,

    /// Extra cycles for operand preparation and result fix-up.
    #[serde(default = "DividerConfig::default_overhead_cycles")]
    pub overhead_cycles: u32,
}

impl DividerConfig {
    /// Returns the default divider radix in bits.
    fn default_bits_per_cycle() -> u32 {
        defaults::DIV_BITS_PER_CYCLE
    }

    /// Returns the default fixed divider overhead.
    fn default_overhead_cycles() -> u32 {
        defaults::DIV_OVERHEAD_CYCLES
    }

    /// Busy cycles for one request with `elem_bits`-wide lanes.
    pub const fn busy_cycles(&self, elem_bits: u32) -> u32 {
        let radix = if self.bits_per_cycle == 0 { 1 } else { self.bits_per_cycle };
        elem_bits.div_ceil(radix) + self.overhead_cycles
    }
}

impl Default for DividerConfig {
    fn default() -> Self {
        Self {
            bits_per_cycle: defaults::DIV_BITS_PER_CYCLE,
            overhead_cycles: defaults::DIV_OVERHEAD_CYCLES,
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use rvvfu_core::config::Config;
///
/// let json = r#"{ "fma": { "latency": 5 }, "divider": { "bits_per_cycle": 1 } }"#;
/// let config = Config::from_json(json)?;
/// assert_eq!(config.fma.latency, 5);
/// assert_eq!(config.adder.latency, 2);
/// assert_eq!(config.divider.busy_cycles(8), 10);
/// # Ok::<(), rvvfu_core::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Adder unit settings.
    #[serde(default)]
    pub adder: AdderConfig,
    /// FMA unit settings.
    #[serde(default)]
    pub fma: FmaConfig,
    /// Divider unit settings.
    #[serde(default)]
    pub divider: DividerConfig,
    /// Emit per-cycle `trace!` events from the divider.
    #[serde(default)]
    pub trace_cycles: bool,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::OutOfRange`] for invalid values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::OutOfRange`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=defaults::MAX_FP_LATENCY).contains(&self.adder.latency) {
            return Err(ConfigError::OutOfRange {
                field: "adder.latency",
                value: self.adder.latency,
                allowed: "1..=8",
            });
        }
        if !(1..=defaults::MAX_FP_LATENCY).contains(&self.fma.latency) {
            return Err(ConfigError::OutOfRange {
                field: "fma.latency",
                value: self.fma.latency,
                allowed: "1..=8",
            });
        }
        if !matches!(self.divider.bits_per_cycle, 1 | 2 | 4 | 8) {
            return Err(ConfigError::OutOfRange {
                field: "divider.bits_per_cycle",
                value: u64::from(self.divider.bits_per_cycle),
                allowed: "1, 2, 4 or 8",
            });
        }
        if self.divider.overhead_cycles > 16 {
            return Err(ConfigError::OutOfRange {
                field: "divider.overhead_cycles",
                value: u64::from(self.divider.overhead_cycles),
                allowed: "0..=16",
            });
        }
        Ok(())
    }
}
