// Rust guideline compliant 2026-10-18

//! Line-oriented `CaptureSource`: keyboard-wedge scanners and operator keys.
//!
//! A keyboard-wedge scanner types the decoded content followed by Enter, so
//! each line of input is one decode. A few short lines are operator keys:
//!
//! | Line          | Input     |
//! |---------------|-----------|
//! | `y`           | `Confirm` |
//! | empty, `n`    | `Dismiss` |
//! | `q`           | `Close`   |
//!
//! End of input closes the session; a read error is reported as a camera
//! failure.

use scanner::{CaptureError, CaptureGuard, CaptureSource, ScanInput, SessionHandle};
use std::sync::{Mutex, PoisonError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, BufReader, Stdin};

/// Map one input line to a session input.
#[must_use]
pub fn parse_line(line: &str) -> ScanInput {
    match line.trim() {
        "y" | "Y" => ScanInput::Confirm,
        "" | "n" | "N" => ScanInput::Dismiss,
        "q" | "Q" => ScanInput::Close,
        _ => ScanInput::Decoded(line.to_owned()),
    }
}

/// Capture source reading lines from an async reader. Can be started once.
#[derive(Debug)]
pub struct LineCapture<R> {
    reader: Mutex<Option<R>>,
}

impl<R> LineCapture<R> {
    /// Wrap `reader`.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self { reader: Mutex::new(Some(reader)) }
    }
}

impl LineCapture<BufReader<Stdin>> {
    /// Read from the process's standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin + Send + 'static> CaptureSource for LineCapture<R> {
    /// Spawn the reading task on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::DeviceUnavailable` outside a runtime or when the
    /// reader was already handed to an earlier session.
    fn start(&self, handle: SessionHandle) -> Result<CaptureGuard, CaptureError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CaptureError::DeviceUnavailable { reason: e.to_string() })?;
        let reader = self
            .reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| CaptureError::DeviceUnavailable {
                reason: "input already in use".to_owned(),
            })?;
        Ok(CaptureGuard::from_task(runtime.spawn(pump(reader, handle))))
    }
}

async fn pump<R: AsyncBufRead + Unpin>(reader: R, handle: SessionHandle) {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                match parse_line(&line) {
                    ScanInput::Decoded(content) => {
                        if !handle.on_decoded(content) {
                            log::debug!("line_capture.frame.dropped");
                        }
                    }
                    input => {
                        handle.send(input).await;
                    }
                }
                if handle.is_closed() {
                    break;
                }
            }
            Ok(None) => {
                log::info!("line_capture.eof");
                handle.close().await;
                break;
            }
            Err(e) => {
                log::error!("line_capture.read.failed: error={e}");
                handle.camera_failed();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LineCapture, parse_line};
    use domain::{CheckOutcome, Desk, DeskError, RedeemOutcome, TicketId};
    use scanner::{CaptureError, CaptureSource as _, Phase, ScanConfig, ScanInput, ScanSession};
    use std::future::pending;

    /// Desk whose calls never return.
    struct SilentDesk;

    impl Desk for SilentDesk {
        async fn check(&self, _id: &TicketId) -> Result<CheckOutcome, DeskError> {
            pending().await
        }

        async fn redeem(&self, _id: &TicketId) -> Result<RedeemOutcome, DeskError> {
            pending().await
        }
    }

    #[test]
    fn keys_and_scans() {
        assert_eq!(parse_line("y"), ScanInput::Confirm);
        assert_eq!(parse_line(" Y "), ScanInput::Confirm);
        assert_eq!(parse_line(""), ScanInput::Dismiss);
        assert_eq!(parse_line("n"), ScanInput::Dismiss);
        assert_eq!(parse_line("q"), ScanInput::Close);
        assert_eq!(parse_line("yes"), ScanInput::Decoded("yes".to_owned()));
        let id = TicketId::from_uuid(uuid::Uuid::new_v4());
        assert_eq!(parse_line(id.as_str()), ScanInput::Decoded(id.to_string()));
    }

    #[tokio::test]
    async fn lines_drive_the_session_until_eof() {
        let id = TicketId::from_uuid(uuid::Uuid::new_v4());
        let input = format!("https://example.com/menu\n{id}\n");
        let reader = tokio::io::BufReader::new(std::io::Cursor::new(input.into_bytes()));
        let capture = LineCapture::new(reader);
        let session = ScanSession::open(SilentDesk, &capture, ScanConfig::default());

        // EOF closes the session while the check is still pending.
        let last = session.run().await;
        assert_eq!(last.phase, Phase::Checking);
        assert_eq!(last.pending_id, Some(id));
    }

    #[tokio::test]
    async fn reader_can_be_taken_once() {
        let capture = LineCapture::new(tokio::io::BufReader::new(std::io::Cursor::new(Vec::new())));
        let first = ScanSession::open(SilentDesk, &capture, ScanConfig::default());
        assert_eq!(first.state().phase, Phase::Idle);

        let second = ScanSession::open(SilentDesk, &capture, ScanConfig::default());
        assert_eq!(second.state().phase, Phase::Error);
        assert!(matches!(
            capture.start(second.handle()),
            Err(CaptureError::DeviceUnavailable { .. })
        ));
    }
}
