// Rust guideline compliant 2026-10-18

//! HTTP front of the desk: the wire contract over an issuer and a
//! redemption coordinator sharing one store.

use crate::wire::{WireRequest, WireResponse};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::{Clock, Desk as _, TicketId, TicketStore};
use issuer::{IssuerConfig, TicketIssuer};
use redemption::RedemptionCoordinator;
use std::sync::Arc;

/// Shared handler state.
#[derive(Debug)]
pub struct DeskState<S, C> {
    issuer: Arc<TicketIssuer<S, C>>,
    coordinator: Arc<RedemptionCoordinator<S, C>>,
}

// Manual impl: derive would require `S: Clone` and `C: Clone`.
impl<S, C> Clone for DeskState<S, C> {
    fn clone(&self) -> Self {
        Self { issuer: Arc::clone(&self.issuer), coordinator: Arc::clone(&self.coordinator) }
    }
}

impl<S: TicketStore + Clone, C: Clock + Clone> DeskState<S, C> {
    /// Wire an issuer and a coordinator to the same `store` and `clock`.
    #[must_use]
    pub fn new(store: S, clock: C, issuer_config: IssuerConfig) -> Self {
        Self {
            issuer: Arc::new(TicketIssuer::new(issuer_config, store.clone(), clock.clone())),
            coordinator: Arc::new(RedemptionCoordinator::new(store, clock)),
        }
    }
}

/// Build the router: `POST /` for the wire contract, `GET /health`.
#[must_use]
pub fn router<S, C>(state: DeskState<S, C>) -> Router
where
    S: TicketStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/", post(handle::<S, C>))
        .route("/health", get(health))
        .with_state(state)
}

#[allow(clippy::unused_async, reason = "axum handlers are async")]
async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

async fn handle<S, C>(
    State(state): State<DeskState<S, C>>,
    Json(request): Json<WireRequest>,
) -> Json<WireResponse>
where
    S: TicketStore + 'static,
    C: Clock + 'static,
{
    let response = match request {
        WireRequest::Register { name, contact } => match state.issuer.issue(&name, &contact).await {
            Ok(ticket) => {
                tracing::info!(id = %ticket.id, "desk.register");
                WireResponse::registered(&ticket)
            }
            Err(e) => {
                tracing::warn!(error = %e, "desk.register.failed");
                WireResponse::error()
            }
        },
        WireRequest::Check { id } => match state.coordinator.check(&TicketId::new(id)).await {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                tracing::warn!(error = %e, "desk.check.failed");
                WireResponse::error()
            }
        },
        WireRequest::Redeem { id } => match state.coordinator.redeem(&TicketId::new(id)).await {
            Ok(outcome) => outcome.into(),
            Err(e) => {
                tracing::warn!(error = %e, "desk.redeem.failed");
                WireResponse::error()
            }
        },
    };
    Json(response)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
