// Rust guideline compliant 2026-10-18

//! Pure scan-session state machine.
//!
//! [`transition`] maps `(state, event)` to the next state plus at most one
//! [`Command`] for the driver to execute. No I/O, no clocks: everything the
//! operator sees is derivable from [`ScanState`].

use domain::{CheckOutcome, RedeemOutcome, TicketId};
use std::fmt;

/// Where the device is in its check -> confirm -> redeem cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for a code. The only phase that accepts decoded input.
    #[default]
    Idle,
    /// A status lookup is in flight.
    Checking,
    /// Lookup result is on screen, waiting for the operator.
    Confirmed,
    /// A redemption is in flight.
    Redeeming,
    /// Ticket consumed; waiting for the operator to advance.
    Done,
    /// Communication or camera failure; waiting for dismissal.
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "ready",
            Self::Checking => "checking",
            Self::Confirmed => "awaiting confirmation",
            Self::Redeeming => "redeeming",
            Self::Done => "done",
            Self::Error => "error",
        })
    }
}

/// Why a cycle ended in `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The desk answered that the store is unreachable, or the transport failed.
    StoreUnavailable,
    /// The desk did not answer within the call timeout.
    TimedOut,
    /// The capture device could not be acquired or stopped delivering.
    CameraUnavailable,
}

/// The fixed set of outcomes an operator can be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Ticket exists and is unused.
    Valid {
        /// Holder name.
        holder: String,
    },
    /// Ticket exists but was already consumed.
    AlreadyUsed {
        /// Holder name.
        holder: String,
    },
    /// No such ticket.
    Invalid,
    /// This device just consumed the ticket.
    Admitted {
        /// Holder name.
        holder: String,
    },
    /// Something failed; the ticket state is unknown.
    Failed(Fault),
}

impl From<CheckOutcome> for Verdict {
    fn from(outcome: CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Unknown => Self::Invalid,
            CheckOutcome::Available { holder } => Self::Valid { holder },
            CheckOutcome::AlreadyRedeemed { holder } => Self::AlreadyUsed { holder },
        }
    }
}

impl Verdict {
    /// Verdict for a redeem answer. A desk may leave out the holder; the name
    /// shown by the preceding check stands in for it.
    fn redeemed(outcome: RedeemOutcome, checked: Option<&Self>) -> Self {
        let known = || match checked {
            Some(Self::Valid { holder }) => holder.clone(),
            _ => String::new(),
        };
        match outcome {
            RedeemOutcome::Unknown => Self::Invalid,
            RedeemOutcome::Success { holder } => {
                Self::Admitted { holder: holder.unwrap_or_else(known) }
            }
            RedeemOutcome::AlreadyRedeemed { holder } => {
                Self::AlreadyUsed { holder: holder.unwrap_or_else(known) }
            }
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid { holder } => write!(f, "valid ticket: {holder}"),
            Self::AlreadyUsed { holder } => write!(f, "already used: {holder}"),
            Self::Invalid => f.write_str("invalid ticket"),
            Self::Admitted { holder } => write!(f, "admitted: {holder}"),
            Self::Failed(Fault::CameraUnavailable) => f.write_str("camera unavailable"),
            Self::Failed(Fault::StoreUnavailable | Fault::TimedOut) => {
                f.write_str("communication error")
            }
        }
    }
}

/// Snapshot of one device's session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanState {
    /// Current phase.
    pub phase: Phase,
    /// Id under evaluation, if any.
    pub pending_id: Option<TicketId>,
    /// Most recent outcome shown to the operator.
    pub last_result: Option<Verdict>,
    /// The camera failed while a ticket was being decided or shown. Reported
    /// on the next dismissal instead of `Idle`.
    pub camera_lost: bool,
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// The capture source decoded a symbol.
    Decoded(String),
    /// The status lookup answered.
    CheckResolved(CheckOutcome),
    /// The redemption answered.
    RedeemResolved(RedeemOutcome),
    /// A desk call failed or timed out.
    CallFailed(Fault),
    /// The capture device failed.
    CameraFailed,
    /// Operator pressed "use ticket".
    Confirm,
    /// Operator dismissed the current screen (also "next" after `Done`).
    Dismiss,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Call `Desk::check`.
    Check(TicketId),
    /// Call `Desk::redeem`.
    Redeem(TicketId),
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Next state.
    pub state: ScanState,
    /// Effect the driver must run, if any.
    pub command: Option<Command>,
}

impl Step {
    fn stay(state: &ScanState) -> Self {
        Self { state: state.clone(), command: None }
    }

    fn to(phase: Phase, pending_id: Option<TicketId>, last_result: Option<Verdict>) -> Self {
        let state = ScanState { phase, pending_id, last_result, camera_lost: false };
        Self { state, command: None }
    }

    fn camera_error(pending_id: Option<TicketId>) -> Self {
        Self::to(Phase::Error, pending_id, Some(Verdict::Failed(Fault::CameraUnavailable)))
    }

    fn keeping_fault(mut self, state: &ScanState) -> Self {
        self.state.camera_lost = state.camera_lost;
        self
    }

    fn with(mut self, command: Command) -> Self {
        self.command = Some(command);
        self
    }
}

/// Compute the next state for `event`.
///
/// Decoded input outside `Idle` is dropped (a code held in front of the camera
/// is reported many times per second). Malformed content is dropped too.
/// Events that make no sense in the current phase leave it unchanged.
///
/// A camera failure ends the cycle only while the device waits on the camera
/// (`Idle`, `Checking`). Once a result is being decided or shown, the fault is
/// held until the operator dismisses the screen.
#[must_use]
pub fn transition(state: &ScanState, event: ScanEvent) -> Step {
    let pending = || state.pending_id.clone();
    match (state.phase, event) {
        (Phase::Idle | Phase::Checking | Phase::Error, ScanEvent::CameraFailed) => {
            Step::camera_error(pending())
        }
        (Phase::Confirmed | Phase::Redeeming | Phase::Done, ScanEvent::CameraFailed) => {
            let mut step = Step::stay(state);
            step.state.camera_lost = true;
            step
        }

        (Phase::Idle, ScanEvent::Decoded(content)) => match codec::decode(&content) {
            Ok(id) => Step::to(Phase::Checking, Some(id.clone()), None).with(Command::Check(id)),
            Err(_) => Step::stay(state),
        },

        (Phase::Checking, ScanEvent::CheckResolved(outcome)) => {
            Step::to(Phase::Confirmed, pending(), Some(outcome.into()))
        }
        (Phase::Checking | Phase::Redeeming, ScanEvent::CallFailed(fault)) => {
            Step::to(Phase::Error, pending(), Some(Verdict::Failed(fault))).keeping_fault(state)
        }

        (Phase::Confirmed, ScanEvent::Confirm) => match (&state.last_result, pending()) {
            (Some(Verdict::Valid { holder }), Some(id)) => Step::to(
                Phase::Redeeming,
                Some(id.clone()),
                Some(Verdict::Valid { holder: holder.clone() }),
            )
            .keeping_fault(state)
            .with(Command::Redeem(id)),
            _ => Step::stay(state),
        },

        (Phase::Redeeming, ScanEvent::RedeemResolved(outcome)) => {
            let phase = if matches!(outcome, RedeemOutcome::Success { .. }) {
                Phase::Done
            } else {
                Phase::Confirmed
            };
            let verdict = Verdict::redeemed(outcome, state.last_result.as_ref());
            Step::to(phase, pending(), Some(verdict)).keeping_fault(state)
        }

        (Phase::Confirmed | Phase::Done | Phase::Error, ScanEvent::Dismiss) => {
            if state.camera_lost {
                Step::camera_error(None)
            } else {
                Step::to(Phase::Idle, None, None)
            }
        }

        _ => Step::stay(state),
    }
}
