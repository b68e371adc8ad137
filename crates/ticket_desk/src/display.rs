// Rust guideline compliant 2026-10-18

//! Operator screen text for the door terminal.

use scanner::{Phase, ScanState, Verdict};

/// One line telling the operator what they see and which keys apply.
#[must_use]
pub fn prompt(state: &ScanState) -> String {
    let shown = state.last_result.as_ref().map_or_else(String::new, ToString::to_string);
    match state.phase {
        Phase::Idle => "ready: scan a ticket".to_owned(),
        Phase::Checking => "checking...".to_owned(),
        Phase::Redeeming => format!("{shown} -- redeeming..."),
        Phase::Confirmed if matches!(state.last_result, Some(Verdict::Valid { .. })) => {
            format!("{shown} -- [y] use ticket, [enter] back")
        }
        Phase::Confirmed | Phase::Error => format!("{shown} -- [enter] back"),
        Phase::Done => format!("{shown} -- [enter] next"),
    }
}
