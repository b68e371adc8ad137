// Rust guideline compliant 2026-10-18

//! HTTP client adapter for the `Desk` port.
//!
//! Speaks the JSON wire contract to a desk server. Transport failures of any
//! kind (connect, timeout, non-2xx, undecodable body, `"error"` status) become
//! `DeskError::StoreUnavailable`; `already_used` and `not_found` stay outcomes.

use crate::wire::{WireRequest, WireResponse, WireStatus};
use domain::{CheckOutcome, Desk, DeskError, RedeemOutcome, TicketId};
use std::time::Duration;

/// `Desk` adapter that calls a remote desk server.
#[derive(Debug, Clone)]
pub struct RemoteDesk {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl RemoteDesk {
    /// Client posting to `url`, giving up on any request after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(url: reqwest::Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    async fn post(&self, request: &WireRequest) -> Result<WireResponse, reqwest::Error> {
        self.client
            .post(self.url.clone())
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<WireResponse>()
            .await
    }

    async fn call(&self, request: &WireRequest) -> Result<WireResponse, DeskError> {
        self.post(request).await.map_err(|e| {
            log::warn!("remote_desk.call.failed: url={} error={e}", self.url);
            DeskError::StoreUnavailable
        })
    }

    /// Register a holder and return the new ticket's id.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::StoreUnavailable` if the server could not issue the
    /// ticket, including when it rejected blank input.
    pub async fn register(&self, name: &str, contact: &str) -> Result<TicketId, DeskError> {
        let request = WireRequest::Register { name: name.to_owned(), contact: contact.to_owned() };
        match self.call(&request).await? {
            WireResponse { status: WireStatus::Success, id: Some(id), .. } => Ok(TicketId::new(id)),
            other => {
                log::warn!("remote_desk.register.refused: status={:?}", other.status);
                Err(DeskError::StoreUnavailable)
            }
        }
    }
}

impl Desk for RemoteDesk {
    async fn check(&self, id: &TicketId) -> Result<CheckOutcome, DeskError> {
        self.call(&WireRequest::Check { id: id.to_string() }).await?.into_check()
    }

    async fn redeem(&self, id: &TicketId) -> Result<RedeemOutcome, DeskError> {
        self.call(&WireRequest::Redeem { id: id.to_string() }).await?.into_redeem()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::RemoteDesk;
    use crate::adapters::in_memory_store::InMemoryTicketStore;
    use crate::server::{DeskState, router};
    use crate::wire::WireRequest;
    use axum::Json;
    use chrono::{TimeZone as _, Utc};
    use domain::{CheckOutcome, Desk as _, DeskError, FixedClock, RedeemOutcome, TicketId};
    use issuer::IssuerConfig;
    use scanner::{
        CaptureError, CaptureGuard, CaptureSource, Phase, ScanConfig, ScanSession, ScanState,
        SessionHandle, Verdict,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    async fn spawn_server() -> reqwest::Url {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap());
        let state = DeskState::new(
            Arc::new(InMemoryTicketStore::new()),
            clock,
            IssuerConfig::builder().build().unwrap(),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(state)).await.unwrap() });
        reqwest::Url::parse(&format!("http://{addr}/")).unwrap()
    }

    /// Desk that answers with the bare minimum: redeem replies carry no name.
    async fn spawn_terse_server() -> reqwest::Url {
        async fn reply(Json(request): Json<WireRequest>) -> Json<Value> {
            Json(match request {
                WireRequest::Check { .. } => json!({"status": "available", "name": "Aki"}),
                WireRequest::Redeem { .. } => json!({"status": "success"}),
                WireRequest::Register { .. } => json!({"status": "error"}),
            })
        }

        let app = axum::Router::new().route("/", axum::routing::post(reply));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        reqwest::Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn client(url: reqwest::Url) -> RemoteDesk {
        RemoteDesk::new(url, Duration::from_secs(2)).unwrap()
    }

    /// Capture source with nothing attached; inputs come through the handle.
    struct NoCamera;

    impl CaptureSource for NoCamera {
        fn start(&self, _handle: SessionHandle) -> Result<CaptureGuard, CaptureError> {
            Ok(CaptureGuard::new(|| {}))
        }
    }

    async fn reach(states: &mut watch::Receiver<ScanState>, phase: Phase) -> ScanState {
        states.wait_for(|s| s.phase == phase).await.unwrap().clone()
    }

    // RD-T01: the Aki scenario over HTTP.
    #[tokio::test]
    async fn register_check_redeem_over_http() {
        let desk = client(spawn_server().await);
        let aki = || "Aki".to_owned();

        let id = desk.register("Aki", "aki@example.com").await.unwrap();
        assert!(id.is_well_formed());
        assert_eq!(desk.check(&id).await, Ok(CheckOutcome::Available { holder: aki() }));
        assert_eq!(desk.redeem(&id).await, Ok(RedeemOutcome::Success { holder: Some(aki()) }));
        assert_eq!(desk.check(&id).await, Ok(CheckOutcome::AlreadyRedeemed { holder: aki() }));
        assert_eq!(
            desk.redeem(&id).await,
            Ok(RedeemOutcome::AlreadyRedeemed { holder: Some(aki()) })
        );
    }

    // RD-T02: unknown ids are outcomes, not errors.
    #[tokio::test]
    async fn unknown_id_is_an_outcome() {
        let desk = client(spawn_server().await);
        let fake = TicketId::new("not-a-real-id");
        assert_eq!(desk.check(&fake).await, Ok(CheckOutcome::Unknown));
        assert_eq!(desk.redeem(&fake).await, Ok(RedeemOutcome::Unknown));
    }

    // RD-T03: blank registration is refused.
    #[tokio::test]
    async fn blank_registration_is_refused() {
        let desk = client(spawn_server().await);
        assert_eq!(desk.register("", "x").await, Err(DeskError::StoreUnavailable));
    }

    // RD-T04: transport failures are StoreUnavailable.
    #[tokio::test]
    async fn transport_failures_are_unavailable() {
        // Nothing listens on a port we bound and released.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let refused = client(reqwest::Url::parse(&format!("http://{addr}/")).unwrap());
        assert_eq!(refused.check(&TicketId::new("T1")).await, Err(DeskError::StoreUnavailable));

        // Wrong path: the server answers 404.
        let mut url = spawn_server().await;
        url.set_path("/nope");
        let lost = client(url);
        assert_eq!(lost.redeem(&TicketId::new("T1")).await, Err(DeskError::StoreUnavailable));
    }

    // RD-T05: two door sessions confirm the same ticket at once; one admits.
    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn two_sessions_one_admission() {
        let url = spawn_server().await;
        let id = client(url.clone()).register("Ren", "ren@example.com").await.unwrap();

        let a = ScanSession::open(client(url.clone()), &NoCamera, ScanConfig::default());
        let b = ScanSession::open(client(url), &NoCamera, ScanConfig::default());
        let (ha, hb) = (a.handle(), b.handle());
        let (mut sa, mut sb) = (a.subscribe(), b.subscribe());
        let run_a = tokio::spawn(a.run());
        let run_b = tokio::spawn(b.run());

        ha.on_decoded(id.to_string());
        hb.on_decoded(id.to_string());
        let valid = Some(Verdict::Valid { holder: "Ren".to_owned() });
        assert_eq!(reach(&mut sa, Phase::Confirmed).await.last_result, valid);
        assert_eq!(reach(&mut sb, Phase::Confirmed).await.last_result, valid);

        tokio::join!(ha.confirm(), hb.confirm());
        let settled = |s: &ScanState| matches!(s.phase, Phase::Done)
            || matches!(s.last_result, Some(Verdict::AlreadyUsed { .. }));
        let fa = sa.wait_for(settled).await.unwrap().clone();
        let fb = sb.wait_for(settled).await.unwrap().clone();

        let admitted = [&fa, &fb].iter().filter(|s| s.phase == Phase::Done).count();
        assert_eq!(admitted, 1, "exactly one door may admit: {fa:?} / {fb:?}");

        ha.close().await;
        hb.close().await;
        run_a.await.unwrap();
        run_b.await.unwrap();
    }

    // RD-T06: a redeem reply with the status alone still admits the holder.
    #[tokio::test]
    async fn redeem_reply_without_name_admits() {
        let url = spawn_terse_server().await;
        let id = TicketId::from_uuid(uuid::Uuid::new_v4());
        let direct = client(url.clone()).redeem(&id).await;
        assert_eq!(direct, Ok(RedeemOutcome::Success { holder: None }));

        let session = ScanSession::open(client(url), &NoCamera, ScanConfig::default());
        let handle = session.handle();
        let mut states = session.subscribe();
        let driver = async {
            handle.on_decoded(id.to_string());
            reach(&mut states, Phase::Confirmed).await;
            handle.confirm().await;
            let done = reach(&mut states, Phase::Done).await;
            assert_eq!(done.last_result, Some(Verdict::Admitted { holder: "Aki".to_owned() }));
            handle.close().await;
        };
        tokio::join!(session.run(), driver);
    }
}
