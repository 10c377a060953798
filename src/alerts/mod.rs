//! One-shot alert scheduling seam.
//!
//! The reminder engine talks to the platform alert service through
//! [`AlertBackend`]: schedule a single future-dated notification, get back an
//! opaque handle, cancel by handle. Cancellation is fallible on purpose:
//! a handle that already fired (or was never known) is an expected
//! [`AlertError::NotFound`], which callers suppress, while real backend
//! failures stay loggable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod oneshot;
pub use oneshot::{FiredAlert, OneShotAlerts};

/// Opaque identifier for a scheduled one-shot alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertHandle(String);

impl AlertHandle {
    /// Mint a fresh handle.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for AlertHandle {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for AlertHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from the alert backend.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The handle names no pending alert: unknown, cancelled, or already
    /// fired. Expected during normal operation.
    #[error("no pending alert for handle {0}")]
    NotFound(AlertHandle),

    /// The backend could not take the request (permission denied, registry
    /// unavailable, invalid trigger).
    #[error("alert backend error: {0}")]
    Backend(String),
}

impl AlertError {
    /// True for cancellation outcomes that are expected in normal operation
    /// and safe to suppress.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, AlertError::NotFound(_))
    }
}

/// Platform alert service: one-shot, future-dated, cancellable by handle.
pub trait AlertBackend: Send + Sync {
    /// Schedule a single notification for `when`. Returns the handle needed
    /// to cancel it later.
    fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        when: DateTime<Utc>,
    ) -> Result<AlertHandle, AlertError>;

    /// Cancel a previously scheduled alert. `NotFound` means the alert
    /// already fired or was never known; tolerate it.
    fn cancel(&self, handle: &AlertHandle) -> Result<(), AlertError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_handles_are_unique() {
        assert_ne!(AlertHandle::generate(), AlertHandle::generate());
    }

    #[test]
    fn handle_roundtrips_through_string() {
        let handle = AlertHandle::generate();
        let stored = handle.as_str().to_string();
        assert_eq!(AlertHandle::from(stored), handle);
    }

    #[test]
    fn not_found_is_ignorable_backend_failure_is_not() {
        assert!(AlertError::NotFound(AlertHandle::generate()).is_ignorable());
        assert!(!AlertError::Backend("permission denied".to_string()).is_ignorable());
    }
}
