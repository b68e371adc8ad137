// Rust guideline compliant 2026-10-12

//! Redemption coordinator -- the door-side `Desk` over a `TicketStore`.
//!
//! [`RedemptionCoordinator`] implements the `domain::Desk` port. `check` is a
//! plain lookup; `redeem` is a single call to the store's atomic conditional
//! transition, so at-most-once consumption holds across any number of devices
//! without client-side locking.

use domain::{
    CheckOutcome, Clock, Desk, DeskError, RedeemOutcome, RedeemTransition, SystemClock, TicketId,
    TicketStatus, TicketStore,
};

// ---------------------------------------------------------------------------
// RedemptionCoordinator
// ---------------------------------------------------------------------------

/// Enforces exactly-once ticket consumption against a `TicketStore`.
///
/// The coordinator is the only writer of ticket status. It never retries a
/// failed `redeem`: the caller sees `StoreUnavailable` and decides.
#[derive(Debug)]
pub struct RedemptionCoordinator<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: TicketStore, C: Clock> RedemptionCoordinator<S, C> {
    /// Create a coordinator over `store`, stamping redemptions with `clock`.
    #[must_use]
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Borrow the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: TicketStore, C: Clock> Desk for RedemptionCoordinator<S, C> {
    /// Report the current status of `id` without touching it.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::StoreUnavailable` if the lookup fails.
    async fn check(&self, id: &TicketId) -> Result<CheckOutcome, DeskError> {
        let ticket = self.store.get(id).await.map_err(|e| {
            log::error!("redemption.check.failed: id={id} error={e}");
            DeskError::StoreUnavailable
        })?;
        let outcome = match ticket {
            None => CheckOutcome::Unknown,
            Some(t) => match t.status {
                TicketStatus::Issued => CheckOutcome::Available { holder: t.holder.name },
                TicketStatus::Redeemed { .. } => {
                    CheckOutcome::AlreadyRedeemed { holder: t.holder.name }
                }
            },
        };
        log::debug!("redemption.check: id={id} outcome={outcome:?}");
        Ok(outcome)
    }

    /// Consume `id` if it is still `Issued`.
    ///
    /// One store round trip: the store decides atomically, so of any number of
    /// racing calls exactly one observes `Success`.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::StoreUnavailable` if the store cannot complete the
    /// transition. The ticket state is then unknown to the caller.
    async fn redeem(&self, id: &TicketId) -> Result<RedeemOutcome, DeskError> {
        let at = self.clock.now();
        let transition = self.store.redeem_if_issued(id, at).await.map_err(|e| {
            log::error!("redemption.redeem.failed: id={id} error={e}");
            DeskError::StoreUnavailable
        })?;
        Ok(match transition {
            RedeemTransition::Redeemed(t) => {
                log::info!("redemption.redeem.success: id={id} at={at}");
                RedeemOutcome::Success { holder: Some(t.holder.name) }
            }
            RedeemTransition::AlreadyRedeemed(t) => {
                log::warn!(
                    "redemption.redeem.already_redeemed: id={id} redeemed_at={:?}",
                    t.redeemed_at()
                );
                RedeemOutcome::AlreadyRedeemed { holder: Some(t.holder.name) }
            }
            RedeemTransition::NotFound => {
                log::warn!("redemption.redeem.unknown: id={id}");
                RedeemOutcome::Unknown
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::RedemptionCoordinator;
    use chrono::{DateTime, TimeZone as _, Utc};
    use domain::{
        CheckOutcome, Desk as _, DeskError, FixedClock, Holder, RedeemOutcome, RedeemTransition,
        StoreError, Ticket, TicketId, TicketStore,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // ------------------------------------------------------------------
    // Test helpers
    // ------------------------------------------------------------------

    fn door_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap()
    }

    /// Map-backed store whose transition runs under one lock.
    struct MapStore {
        inner: Mutex<HashMap<TicketId, Ticket>>,
        writes: AtomicUsize,
    }

    impl MapStore {
        fn with(tickets: Vec<Ticket>) -> Self {
            let map = tickets.into_iter().map(|t| (t.id.clone(), t)).collect();
            Self { inner: Mutex::new(map), writes: AtomicUsize::new(0) }
        }

        fn snapshot(&self, id: &TicketId) -> Option<Ticket> {
            self.inner.lock().unwrap().get(id).cloned()
        }
    }

    impl TicketStore for MapStore {
        async fn insert(&self, ticket: Ticket) -> Result<(), StoreError> {
            self.inner.lock().unwrap().insert(ticket.id.clone(), ticket);
            Ok(())
        }

        async fn get(&self, id: &TicketId) -> Result<Option<Ticket>, StoreError> {
            Ok(self.snapshot(id))
        }

        async fn redeem_if_issued(
            &self,
            id: &TicketId,
            at: DateTime<Utc>,
        ) -> Result<RedeemTransition, StoreError> {
            let mut map = self.inner.lock().unwrap();
            let Some(ticket) = map.get_mut(id) else {
                return Ok(RedeemTransition::NotFound);
            };
            if ticket.mark_redeemed(at) {
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(RedeemTransition::Redeemed(ticket.clone()))
            } else {
                Ok(RedeemTransition::AlreadyRedeemed(ticket.clone()))
            }
        }
    }

    /// Store that is always down.
    struct DownStore;

    impl TicketStore for DownStore {
        async fn insert(&self, _ticket: Ticket) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }

        async fn get(&self, _id: &TicketId) -> Result<Option<Ticket>, StoreError> {
            Err(StoreError::Unavailable)
        }

        async fn redeem_if_issued(
            &self,
            _id: &TicketId,
            _at: DateTime<Utc>,
        ) -> Result<RedeemTransition, StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    fn ticket(token: &str, name: &str) -> Ticket {
        Ticket::issued(
            TicketId::new(token),
            Holder::new(name, "contact@example.com").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        )
    }

    fn coordinator(tickets: Vec<Ticket>) -> RedemptionCoordinator<MapStore, FixedClock> {
        RedemptionCoordinator::new(MapStore::with(tickets), FixedClock::new(door_time()))
    }

    // ------------------------------------------------------------------
    // Scenarios
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn check_redeem_check_redeem_scenario() {
        let desk = coordinator(vec![ticket("T1", "Aki")]);
        let t1 = TicketId::new("T1");
        let aki = || "Aki".to_owned();

        assert_eq!(desk.check(&t1).await, Ok(CheckOutcome::Available { holder: aki() }));
        assert_eq!(desk.redeem(&t1).await, Ok(RedeemOutcome::Success { holder: Some(aki()) }));
        assert_eq!(desk.check(&t1).await, Ok(CheckOutcome::AlreadyRedeemed { holder: aki() }));
        assert_eq!(
            desk.redeem(&t1).await,
            Ok(RedeemOutcome::AlreadyRedeemed { holder: Some(aki()) })
        );

        let stored = desk.store().snapshot(&t1).unwrap();
        assert_eq!(stored.redeemed_at(), Some(door_time()));
        assert_eq!(desk.store().writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_id_is_not_already_redeemed() {
        let desk = coordinator(vec![ticket("T1", "Aki")]);
        let fake = TicketId::new("not-a-real-id");
        assert_eq!(desk.check(&fake).await, Ok(CheckOutcome::Unknown));
        assert_eq!(desk.redeem(&fake).await, Ok(RedeemOutcome::Unknown));
    }

    #[tokio::test]
    async fn check_never_mutates() {
        let desk = coordinator(vec![ticket("T1", "Aki"), ticket("T2", "Ren")]);
        let t1 = TicketId::new("T1");
        let t2 = TicketId::new("T2");
        desk.redeem(&t2).await.unwrap();
        let before_t1 = desk.store().snapshot(&t1);
        let before_t2 = desk.store().snapshot(&t2);

        for _ in 0..50 {
            desk.check(&t1).await.unwrap();
            desk.check(&t2).await.unwrap();
        }

        assert_eq!(desk.store().snapshot(&t1), before_t1);
        assert_eq!(desk.store().snapshot(&t2), before_t2);
        assert_eq!(desk.store().writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_unavailable() {
        let desk = RedemptionCoordinator::new(DownStore, FixedClock::new(door_time()));
        let id = TicketId::new("T1");
        assert_eq!(desk.check(&id).await, Err(DeskError::StoreUnavailable));
        assert_eq!(desk.redeem(&id).await, Err(DeskError::StoreUnavailable));
    }

    // ------------------------------------------------------------------
    // At-most-once under concurrency
    // ------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_redeems_yield_exactly_one_success() {
        const CALLERS: usize = 64;
        let desk = Arc::new(coordinator(vec![ticket("T2", "Ren")]));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let desk = Arc::clone(&desk);
                tokio::spawn(async move { desk.redeem(&TicketId::new("T2")).await })
            })
            .collect();

        let mut successes = 0;
        let mut already = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(RedeemOutcome::Success { .. }) => successes += 1,
                Ok(RedeemOutcome::AlreadyRedeemed { holder }) => {
                    assert_eq!(holder.as_deref(), Some("Ren"));
                    already += 1;
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(successes, 1, "exactly one caller may consume the ticket");
        assert_eq!(already, CALLERS - 1);
        assert_eq!(desk.store().writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn two_sessions_same_instant_one_success() {
        let desk = Arc::new(coordinator(vec![ticket("T2", "Ren")]));
        let id = TicketId::new("T2");
        let (a, b) = tokio::join!(desk.redeem(&id), desk.redeem(&id));
        let wins = [a, b]
            .into_iter()
            .filter(|r| matches!(r, Ok(RedeemOutcome::Success { .. })))
            .count();
        assert_eq!(wins, 1);
    }
}
