// Rust guideline compliant 2026-10-18

//! In-memory adapter for the `TicketStore` port.
//!
//! For tests and single-process demos. The conditional redemption runs inside
//! one `Mutex` critical section, which is what makes it atomic across tasks.

use chrono::{DateTime, Utc};
use domain::{RedeemTransition, StoreError, Ticket, TicketId, TicketStore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// `TicketStore` adapter backed by a `HashMap` behind a `Mutex`.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    inner: Mutex<HashMap<TicketId, Ticket>>,
}

impl InMemoryTicketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when no ticket has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TicketId, Ticket>> {
        // A panic while holding the lock cannot leave a half-written ticket:
        // every mutation is a single insert or status assignment.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TicketStore for InMemoryTicketStore {
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateId` if the id is already present.
    async fn insert(&self, ticket: Ticket) -> Result<(), StoreError> {
        let mut map = self.lock();
        if map.contains_key(&ticket.id) {
            return Err(StoreError::DuplicateId { id: ticket.id });
        }
        map.insert(ticket.id.clone(), ticket);
        Ok(())
    }

    async fn get(&self, id: &TicketId) -> Result<Option<Ticket>, StoreError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn redeem_if_issued(
        &self,
        id: &TicketId,
        at: DateTime<Utc>,
    ) -> Result<RedeemTransition, StoreError> {
        let mut map = self.lock();
        let Some(ticket) = map.get_mut(id) else {
            return Ok(RedeemTransition::NotFound);
        };
        Ok(if ticket.mark_redeemed(at) {
            RedeemTransition::Redeemed(ticket.clone())
        } else {
            RedeemTransition::AlreadyRedeemed(ticket.clone())
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
