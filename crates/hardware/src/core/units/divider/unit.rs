//! Handshake-driven divider state machine.

use tracing::{debug, trace, warn};

use super::algorithm::{collect, prepare_lanes, LaneDivision};
use super::request::{DivRequest, DivResult, ElementWidth};
use crate::common::error::{UnitError, UnitResult};
use crate::config::{Config, DividerConfig};

/// Input ports sampled on one clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DivPorts {
    /// `in_valid` with its payload.
    pub input: Option<DivRequest>,
    /// Consumer is ready to take the result.
    pub out_ready: bool,
    /// Abandon any operation in progress.
    pub flush: bool,
}

impl DivPorts {
    /// No input asserted.
    pub const fn idle() -> Self {
        Self {
            input: None,
            out_ready: false,
            flush: false,
        }
    }

    /// Presents `req` with `in_valid`.
    pub const fn request(req: DivRequest) -> Self {
        Self {
            input: Some(req),
            out_ready: false,
            flush: false,
        }
    }

    /// Asserts `out_ready`.
    #[must_use]
    pub const fn ready(mut self) -> Self {
        self.out_ready = true;
        self
    }

    /// Asserts `flush`.
    #[must_use]
    pub const fn flushing(mut self) -> Self {
        self.flush = true;
        self
    }
}

/// What happened on one clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// A request was captured.
    pub accepted: bool,
    /// A result was handed to the consumer.
    pub delivered: Option<DivResult>,
}

/// Control state of the divider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DivState {
    /// Waiting for a request.
    Idle,
    /// Dividing; `elapsed` of `total` busy cycles done.
    Busy {
        /// Busy cycles completed.
        elapsed: u32,
        /// Busy cycles for this request's width.
        total: u32,
    },
    /// Holding a result until the consumer takes it.
    Done,
}

/// Multi-cycle SIMD integer divider with valid/ready handshakes.
///
/// A request accepted on tick `t` raises `out_valid` after tick
/// `t + busy_cycles(width)`.
///
/// # Examples
///
/// ```
/// use rvvfu_core::config::Config;
/// use rvvfu_core::core::units::divider::{pack, DivPorts, DivRequest, ElementWidth, IntegerDividerUnit};
///
/// let mut div = IntegerDividerUnit::new(&Config::default());
/// let w = ElementWidth::E8;
/// let req = DivRequest::new(w, true, pack(w, [0xF6]), pack(w, [0x02]));
/// assert!(div.tick(&DivPorts::request(req)).accepted);
/// while !div.out_valid() {
///     let _ = div.tick(&DivPorts::idle());
/// }
/// let result = div.tick(&DivPorts::idle().ready()).delivered;
/// assert_eq!(result.map(|r| r.quotient.lane(w.view(), 0)), Some(0xFB));
/// ```
#[derive(Debug)]
pub struct IntegerDividerUnit {
    timing: DividerConfig,
    trace_cycles: bool,
    state: DivState,
    cycle: u64,
    current: Option<DivRequest>,
    lanes: Vec<Option<LaneDivision>>,
    held: Option<DivResult>,
}

impl IntegerDividerUnit {
    /// Creates an idle divider with the configured timing.
    pub fn new(config: &Config) -> Self {
        Self {
            timing: config.divider.clone(),
            trace_cycles: config.trace_cycles,
            state: DivState::Idle,
            cycle: 0,
            current: None,
            lanes: Vec::new(),
            held: None,
        }
    }

    /// Current control state.
    #[inline]
    pub const fn state(&self) -> DivState {
        self.state
    }

    /// Ticks elapsed since construction.
    #[inline]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// `in_ready`: a request would be captured on the next tick.
    #[inline]
    pub const fn in_ready(&self) -> bool {
        matches!(self.state, DivState::Idle)
    }

    /// `out_valid`: a result is held for the consumer.
    #[inline]
    pub const fn out_valid(&self) -> bool {
        matches!(self.state, DivState::Done)
    }

    /// The held result, while `out_valid`.
    #[inline]
    pub const fn result(&self) -> Option<&DivResult> {
        self.held.as_ref()
    }

    /// Busy cycles a request of `width` occupies.
    #[inline]
    pub const fn busy_cycles(&self, width: ElementWidth) -> u32 {
        self.timing.busy_cycles(width.bits())
    }

    /// Drives `req` with `in_valid` for one tick.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::DividerBusy`] without ticking when the divider
    /// is not [`in_ready`](Self::in_ready).
    pub fn submit(&mut self, req: DivRequest) -> UnitResult<()> {
        if !self.in_ready() {
            return Err(UnitError::DividerBusy);
        }
        let _ = self.tick(&DivPorts::request(req));
        Ok(())
    }

    /// Advances one clock edge with the sampled port values.
    pub fn tick(&mut self, ports: &DivPorts) -> TickOutcome {
        self.cycle += 1;
        let mut outcome = TickOutcome::default();

        if ports.flush {
            if !self.in_ready() {
                warn!(cycle = self.cycle, state = ?self.state, "divider flushed");
            }
            self.reset();
            return outcome;
        }

        match self.state {
            DivState::Idle => {
                if let Some(req) = ports.input {
                    self.capture(req);
                    outcome.accepted = true;
                }
            }
            DivState::Busy { elapsed, total } => self.advance(elapsed + 1, total),
            DivState::Done => {
                if ports.out_ready {
                    outcome.delivered = self.held.take();
                    self.state = DivState::Idle;
                    debug!(cycle = self.cycle, "divider result taken");
                    if let Some(req) = ports.input {
                        self.capture(req);
                        outcome.accepted = true;
                    }
                }
            }
        }
        outcome
    }

    fn capture(&mut self, req: DivRequest) {
        let total = self.busy_cycles(req.width);
        self.lanes = prepare_lanes(&req);
        self.current = Some(req);
        self.state = DivState::Busy { elapsed: 0, total };
        debug!(
            cycle = self.cycle,
            width = ?req.width,
            signed = req.signed,
            busy_cycles = total,
            "divider accept"
        );
    }

    /// Runs busy cycle `elapsed` (1-based) of `total`.
    ///
    /// The first half of the overhead prepares operands, the iteration
    /// cycles follow, and the remaining overhead fixes up signs.
    fn advance(&mut self, elapsed: u32, total: u32) {
        let prep = self.timing.overhead_cycles.div_ceil(2);
        if elapsed > prep {
            for lane in self.lanes.iter_mut().flatten() {
                lane.iterate(self.timing.bits_per_cycle.max(1));
            }
        }
        if self.trace_cycles {
            let pending = self.lanes.iter().flatten().filter(|l| !l.is_complete()).count();
            trace!(cycle = self.cycle, elapsed, total, pending, "divider busy");
        }

        if elapsed < total {
            self.state = DivState::Busy { elapsed, total };
            return;
        }
        let Some(req) = self.current.take() else {
            self.reset();
            return;
        };
        let result = collect(req.width, &self.lanes);
        self.lanes.clear();
        self.held = Some(result);
        self.state = DivState::Done;
        debug!(cycle = self.cycle, dz_mask = result.dz_mask, "divider done");
    }

    /// Drops every piece of in-flight state and returns to Idle.
    fn reset(&mut self) {
        self.state = DivState::Idle;
        self.current = None;
        self.lanes.clear();
        self.held = None;
    }
}
