// Rust guideline compliant 2026-10-18

//! JSON wire contract between door devices and the desk server.
//!
//! One `POST` endpoint; requests are tagged by `action`:
//!
//! ```text
//! {"action":"register","name":"Aki","contact":"aki@example.com"}
//!   -> {"status":"success","id":"..."} | {"status":"error"}
//! {"action":"check","id":"..."}
//!   -> {"status":"available"|"already_used","name":"..."} | {"status":"not_found"}
//! {"action":"redeem","id":"..."}
//!   -> {"status":"success"|"already_used"|"not_found"|"error"}
//! ```
//!
//! This server adds the holder `name` to `success` and `already_used` redeem
//! replies; clients must not rely on it.

use domain::{CheckOutcome, DeskError, RedeemOutcome, Ticket};
use serde::{Deserialize, Serialize};

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WireRequest {
    /// Issue a new ticket.
    Register {
        /// Holder name.
        name: String,
        /// Holder contact.
        contact: String,
    },
    /// Look up a ticket without consuming it.
    Check {
        /// Ticket id.
        id: String,
    },
    /// Consume a ticket.
    Redeem {
        /// Ticket id.
        id: String,
    },
}

/// Closed set of response statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireStatus {
    /// Registered, or redeemed by this call.
    Success,
    /// Exists and unused.
    Available,
    /// Exists and consumed.
    AlreadyUsed,
    /// No such ticket.
    NotFound,
    /// The server could not complete the request.
    Error,
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireResponse {
    /// Outcome.
    pub status: WireStatus,
    /// Id of a freshly registered ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Holder name, when a ticket was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl WireResponse {
    fn bare(status: WireStatus) -> Self {
        Self { status, id: None, name: None }
    }

    fn named(status: WireStatus, name: Option<String>) -> Self {
        Self { status, id: None, name }
    }

    /// `{"status":"error"}`.
    #[must_use]
    pub fn error() -> Self {
        Self::bare(WireStatus::Error)
    }

    /// Reply to a successful `register`.
    #[must_use]
    pub fn registered(ticket: &Ticket) -> Self {
        Self {
            status: WireStatus::Success,
            id: Some(ticket.id.to_string()),
            name: Some(ticket.holder.name.clone()),
        }
    }

    /// Interpret a `check` reply.
    ///
    /// # Errors
    ///
    /// Any status that is not a `check` answer, or a found ticket without a
    /// name, is `DeskError::StoreUnavailable`.
    pub fn into_check(self) -> Result<CheckOutcome, DeskError> {
        match (self.status, self.name) {
            (WireStatus::NotFound, _) => Ok(CheckOutcome::Unknown),
            (WireStatus::Available, Some(holder)) => Ok(CheckOutcome::Available { holder }),
            (WireStatus::AlreadyUsed, Some(holder)) => Ok(CheckOutcome::AlreadyRedeemed { holder }),
            _ => Err(DeskError::StoreUnavailable),
        }
    }

    /// Interpret a `redeem` reply. The name is optional here.
    ///
    /// # Errors
    ///
    /// `error`, or any status that is not a `redeem` answer, is
    /// `DeskError::StoreUnavailable`.
    pub fn into_redeem(self) -> Result<RedeemOutcome, DeskError> {
        match self.status {
            WireStatus::NotFound => Ok(RedeemOutcome::Unknown),
            WireStatus::Success => Ok(RedeemOutcome::Success { holder: self.name }),
            WireStatus::AlreadyUsed => Ok(RedeemOutcome::AlreadyRedeemed { holder: self.name }),
            WireStatus::Available | WireStatus::Error => Err(DeskError::StoreUnavailable),
        }
    }
}

impl From<CheckOutcome> for WireResponse {
    fn from(outcome: CheckOutcome) -> Self {
        match outcome {
            CheckOutcome::Unknown => Self::bare(WireStatus::NotFound),
            CheckOutcome::Available { holder } => Self::named(WireStatus::Available, Some(holder)),
            CheckOutcome::AlreadyRedeemed { holder } => {
                Self::named(WireStatus::AlreadyUsed, Some(holder))
            }
        }
    }
}

impl From<RedeemOutcome> for WireResponse {
    fn from(outcome: RedeemOutcome) -> Self {
        match outcome {
            RedeemOutcome::Unknown => Self::bare(WireStatus::NotFound),
            RedeemOutcome::Success { holder } => Self::named(WireStatus::Success, holder),
            RedeemOutcome::AlreadyRedeemed { holder } => {
                Self::named(WireStatus::AlreadyUsed, holder)
            }
        }
    }
}
