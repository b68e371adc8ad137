// Rust guideline compliant 2026-10-18

//! Capture-source port.
//!
//! A capture source (camera, keyboard-wedge scanner, test harness) pushes what
//! it decodes into a [`SessionHandle`]. Acquiring the device yields a
//! [`CaptureGuard`]; dropping the guard releases the device.

use crate::session::SessionHandle;
use std::fmt;
use tokio::task::JoinHandle;

/// Errors raised while acquiring a capture device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The device is absent, busy, or permission was denied.
    #[error("capture device unavailable: {reason}")]
    DeviceUnavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// Something that can deliver decoded symbols to a session.
pub trait CaptureSource {
    /// Acquire the device and start delivering into `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::DeviceUnavailable`] when the device cannot be
    /// acquired. The session then opens in its error phase.
    fn start(&self, handle: SessionHandle) -> Result<CaptureGuard, CaptureError>;
}

/// Releases a capture device when dropped.
pub struct CaptureGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CaptureGuard {
    /// Guard that runs `release` exactly once, on drop.
    #[must_use]
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// Guard that aborts a delivery task on drop.
    #[must_use]
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self::new(move || task.abort())
    }
}

impl fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureGuard").field("armed", &self.release.is_some()).finish()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            log::debug!("capture.released");
            release();
        }
    }
}
