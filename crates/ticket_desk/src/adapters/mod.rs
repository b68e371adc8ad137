// Rust guideline compliant 2026-10-18

//! Adapters for the gate's hexagonal ports.
//!
//! Stores implement `domain::TicketStore`, [`remote_desk`] implements
//! `domain::Desk` over HTTP, and [`line_capture`] implements
//! `scanner::CaptureSource` for keyboard-wedge input.

pub mod in_memory_store;
pub mod line_capture;
pub mod remote_desk;
pub mod sqlite_store;
