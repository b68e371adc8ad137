// Rust guideline compliant 2026-10-18

//! Desk server entry point.
//!
//! Serves the ticket wire contract over a `SQLite` store until CTRL+C.
//!
//! # Usage
//!
//! ```text
//! RUST_LOG=info cargo run --bin ticket_desk
//!
//! # Other database and address
//! TICKET_DESK_DB_URL=sqlite:/var/lib/gate.db TICKET_DESK_ADDR=0.0.0.0:8080 \
//!     cargo run --bin ticket_desk
//! ```

use anyhow::Context as _;
use domain::SystemClock;
use issuer::IssuerConfig;
use std::future::IntoFuture as _;
use ticket_desk::adapters::sqlite_store::SqliteTicketStore;
use ticket_desk::config::bootstrap;
use ticket_desk::server::{DeskState, router};
use tracing::Instrument as _;

/// Pool size for the server's `SQLite` connections.
const MAX_CONNECTIONS: u32 = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap()?;

    let store = SqliteTicketStore::open(&config.db_url, MAX_CONNECTIONS)
        .await
        .context("failed to open SQLite store")?;
    let issuer_config = IssuerConfig::builder().build().context("failed to build issuer config")?;
    let state = DeskState::new(store, SystemClock, issuer_config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, db = %config.db_url, "main.listening");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "main.ctrl_c.failed");
        }
        tracing::info!("main.shutdown: ctrl_c received, draining requests");
    };

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .into_future()
        .instrument(tracing::info_span!("desk"))
        .await
        .context("server failed")?;

    Ok(())
}
