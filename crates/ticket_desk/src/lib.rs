// Rust guideline compliant 2026-10-18

//! Desk server and door terminal wiring.
//!
//! The `ticket_desk` binary serves the wire contract in [`wire`] through
//! [`server::router`] over a `SQLite` store. The `ticket_scan` binary runs a
//! scan session against a [`adapters::remote_desk::RemoteDesk`], fed by
//! [`adapters::line_capture::LineCapture`] on standard input.

pub mod adapters;
pub mod config;
pub mod display;
pub mod server;
pub mod wire;
