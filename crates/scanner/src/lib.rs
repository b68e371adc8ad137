// Rust guideline compliant 2026-10-18

//! Scanner component -- the door device's check -> confirm -> redeem loop.
//!
//! [`machine`] holds the pure transition function, [`session`] drives it
//! against a `domain::Desk`, and [`capture`] is the port a camera or
//! keyboard-wedge scanner plugs into.

pub mod capture;
pub mod machine;
pub mod session;

pub use capture::{CaptureError, CaptureGuard, CaptureSource};
pub use machine::{Command, Fault, Phase, ScanEvent, ScanState, Step, Verdict, transition};
pub use session::{ScanConfig, ScanConfigBuilder, ScanError, ScanInput, ScanSession, SessionHandle};
