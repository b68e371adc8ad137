// Rust guideline compliant 2026-10-18

//! Door terminal entry point.
//!
//! Runs one scan session against a desk server. A keyboard-wedge scanner (or
//! a person typing) supplies lines on standard input: ticket ids, `y` to use
//! the ticket on screen, Enter or `n` to go back, `q` to quit.
//!
//! # Usage
//!
//! ```text
//! TICKET_DESK_URL=http://desk.local:8080/ RUST_LOG=info cargo run --bin ticket_scan
//! ```

use anyhow::Context as _;
use scanner::{ScanConfig, ScanSession};
use ticket_desk::adapters::line_capture::LineCapture;
use ticket_desk::adapters::remote_desk::RemoteDesk;
use ticket_desk::config::bootstrap;
use ticket_desk::display::prompt;
use tracing::Instrument as _;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap()?;

    let desk = RemoteDesk::new(config.desk_url.clone(), config.call_timeout)
        .context("failed to build HTTP client")?;
    let scan_config = ScanConfig::builder()
        .call_timeout(config.call_timeout)
        .build()
        .context("failed to build scan config")?;

    let session = ScanSession::open(desk, &LineCapture::stdin(), scan_config);
    let mut states = session.subscribe();
    println!("{}", prompt(session.state()));

    let display = async move {
        while states.changed().await.is_ok() {
            let line = prompt(&states.borrow_and_update());
            println!("{line}");
        }
    };

    // Dropping the session on CTRL+C releases standard input.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("main.shutdown: ctrl_c received");
        }
        (last, ()) = async { tokio::join!(session.run(), display) }
            .instrument(tracing::info_span!("scan", desk = %config.desk_url)) => {
            tracing::info!(phase = %last.phase, "main.session.closed");
        }
    }

    Ok(())
}
