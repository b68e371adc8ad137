// Rust guideline compliant 2026-10-12

//! Shared domain types for the ticket gate.
//!
//! Defines `Ticket`, `TicketId`, `Holder`, the check/redeem outcomes, and the
//! hexagonal port traits: `TicketStore`, `Desk`, and `Clock`.
//! All gate components depend on this crate; adapters live in `ticket_desk`.

use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Ticket identity
// ---------------------------------------------------------------------------

/// Opaque ticket token.
///
/// Any string can be looked up; tickets minted by the issuer always carry the
/// canonical lowercase hyphenated text of a random UUID (see
/// [`TicketId::is_well_formed`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(String);

impl TicketId {
    /// Wrap an arbitrary token. No validation is performed.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Build the canonical token for `uuid`.
    #[must_use]
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }

    /// Borrow the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the token has the shape of an issued id: a UUID in
    /// canonical lowercase hyphenated form, with nothing around it.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        uuid::Uuid::try_parse(&self.0).is_ok_and(|uuid| uuid.hyphenated().to_string() == self.0)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Holder
// ---------------------------------------------------------------------------

/// Registration data rejected by [`Holder::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HolderError {
    /// Name is empty after trimming.
    #[error("holder name is empty")]
    EmptyName,
    /// Contact is empty after trimming.
    #[error("holder contact is empty")]
    EmptyContact,
}

/// Person a ticket was issued to. Immutable after issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holder {
    /// Display name, trimmed and non-empty.
    pub name: String,
    /// Free-text contact (e-mail, phone, handle), trimmed and non-empty.
    pub contact: String,
}

impl Holder {
    /// Trim both fields and reject empties.
    ///
    /// # Errors
    ///
    /// Returns [`HolderError::EmptyName`] or [`HolderError::EmptyContact`].
    pub fn new(name: &str, contact: &str) -> Result<Self, HolderError> {
        let name = name.trim();
        let contact = contact.trim();
        if name.is_empty() {
            return Err(HolderError::EmptyName);
        }
        if contact.is_empty() {
            return Err(HolderError::EmptyContact);
        }
        Ok(Self { name: name.to_owned(), contact: contact.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// Lifecycle state of a ticket.
///
/// The redemption timestamp lives inside `Redeemed`, so a ticket carries one
/// exactly when it has been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    /// Issued and not yet consumed.
    Issued,
    /// Consumed at the door.
    Redeemed {
        /// When the single successful redemption happened.
        at: DateTime<Utc>,
    },
}

/// A single-use entry credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Unique token; immutable.
    pub id: TicketId,
    /// Who the ticket was issued to.
    pub holder: Holder,
    /// Current lifecycle state. Only the redemption path writes it.
    pub status: TicketStatus,
    /// Creation time.
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    /// Build a fresh `Issued` ticket.
    #[must_use]
    pub fn issued(id: TicketId, holder: Holder, issued_at: DateTime<Utc>) -> Self {
        Self { id, holder, status: TicketStatus::Issued, issued_at }
    }

    /// Redemption time, present iff the ticket is redeemed.
    #[must_use]
    pub fn redeemed_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            TicketStatus::Issued => None,
            TicketStatus::Redeemed { at } => Some(at),
        }
    }

    /// `true` once the ticket has been consumed.
    #[must_use]
    pub fn is_redeemed(&self) -> bool {
        matches!(self.status, TicketStatus::Redeemed { .. })
    }

    /// Apply the `Issued -> Redeemed` transition.
    ///
    /// Returns `false` and leaves the ticket untouched if it was already
    /// redeemed. Store adapters call this inside their atomic section.
    pub fn mark_redeemed(&mut self, at: DateTime<Utc>) -> bool {
        match self.status {
            TicketStatus::Issued => {
                self.status = TicketStatus::Redeemed { at };
                true
            }
            TicketStatus::Redeemed { .. } => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a read-only status lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// No ticket with this id exists (garbled or forged code).
    Unknown,
    /// Valid and not yet used.
    Available {
        /// Holder name, shown to the operator before confirming.
        holder: String,
    },
    /// Valid but already consumed.
    AlreadyRedeemed {
        /// Holder name.
        holder: String,
    },
}

/// Result of a redemption attempt that reached the store.
///
/// The holder name is optional: a remote desk may answer with the status
/// alone, and the device already showed the name when it checked the ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// No ticket with this id exists.
    Unknown,
    /// This call performed the one and only `Issued -> Redeemed` transition.
    Success {
        /// Holder name, if the desk reported it.
        holder: Option<String>,
    },
    /// Someone else (or an earlier call) already consumed the ticket.
    AlreadyRedeemed {
        /// Holder name, if the desk reported it.
        holder: Option<String>,
    },
}

/// What the store's atomic conditional transition observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemTransition {
    /// No record for the id.
    NotFound,
    /// The record was `Issued` and is now `Redeemed`; carries the new state.
    Redeemed(Ticket),
    /// The record was already `Redeemed`; carries it unchanged.
    AlreadyRedeemed(Ticket),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors a `TicketStore` implementation may return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Insert rejected: a record with this id already exists.
    #[error("ticket id already exists: {id}")]
    DuplicateId {
        /// The colliding id.
        id: TicketId,
    },
    /// The store could not complete the operation.
    #[error("ticket store unavailable")]
    Unavailable,
}

/// Errors surfaced by a `Desk`.
///
/// Application-level outcomes (`Unknown`, `AlreadyRedeemed`) are never errors;
/// this only means the redemption state could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeskError {
    /// Store or transport failure. Treat the ticket state as unknown.
    #[error("ticket store unavailable")]
    StoreUnavailable,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Hexagonal port: authoritative ticket storage.
///
/// `redeem_if_issued` is the only correctness boundary for cross-device
/// redemption: implementations must perform the read-check-write as one
/// indivisible step with respect to every other caller.
pub trait TicketStore: Send + Sync {
    /// Insert a new ticket.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if the id is taken, or
    /// [`StoreError::Unavailable`] on backend failure.
    fn insert(&self, ticket: Ticket) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetch a ticket without modifying it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on backend failure.
    fn get(&self, id: &TicketId) -> impl Future<Output = Result<Option<Ticket>, StoreError>> + Send;

    /// Atomically transition `id` from `Issued` to `Redeemed { at }`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on backend failure.
    fn redeem_if_issued(
        &self,
        id: &TicketId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<RedeemTransition, StoreError>> + Send;
}

impl<S: TicketStore> TicketStore for Arc<S> {
    fn insert(&self, ticket: Ticket) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).insert(ticket)
    }

    fn get(
        &self,
        id: &TicketId,
    ) -> impl Future<Output = Result<Option<Ticket>, StoreError>> + Send {
        (**self).get(id)
    }

    fn redeem_if_issued(
        &self,
        id: &TicketId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<RedeemTransition, StoreError>> + Send {
        (**self).redeem_if_issued(id, at)
    }
}

/// Hexagonal port: the check/redeem contract a scanning device talks to.
///
/// Implemented locally by the redemption coordinator and remotely by the
/// HTTP client adapter.
pub trait Desk: Send + Sync {
    /// Look up the current status of `id`. Never mutates.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::StoreUnavailable`] when the status is unknowable.
    fn check(&self, id: &TicketId) -> impl Future<Output = Result<CheckOutcome, DeskError>> + Send;

    /// Consume `id` if and only if it is still `Issued`.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::StoreUnavailable`]; the caller must not assume success.
    fn redeem(
        &self,
        id: &TicketId,
    ) -> impl Future<Output = Result<RedeemOutcome, DeskError>> + Send;
}

impl<D: Desk> Desk for Arc<D> {
    fn check(&self, id: &TicketId) -> impl Future<Output = Result<CheckOutcome, DeskError>> + Send {
        (**self).check(id)
    }

    fn redeem(
        &self,
        id: &TicketId,
    ) -> impl Future<Output = Result<RedeemOutcome, DeskError>> + Send {
        (**self).redeem(id)
    }
}

/// Hexagonal port: wall-clock time for issuance and redemption stamps.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// `Clock` backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// `Clock` that always returns the same instant. Used in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock frozen at `time`.
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}
