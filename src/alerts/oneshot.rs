//! In-process one-shot alert service.
//!
//! Pending alerts live in a registry keyed by handle; a fire loop polls once a
//! minute and drains anything due onto an mpsc channel for delivery.
//! Sleep/wake gaps are detected by time-jump polling; alerts that came due
//! while the process was suspended fire on the next tick rather than being
//! dropped.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::{AlertBackend, AlertError, AlertHandle};

/// Default poll interval for the fire loop (1 minute)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Time jump threshold to detect sleep/wake (5 minutes)
const TIME_JUMP_THRESHOLD_SECS: i64 = 300;

/// An alert whose fire time has arrived.
#[derive(Debug, Clone)]
pub struct FiredAlert {
    pub handle: AlertHandle,
    pub title: String,
    pub body: String,
    pub fire_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct PendingAlert {
    title: String,
    body: String,
    fire_at: DateTime<Utc>,
}

/// Registry of scheduled one-shot alerts.
#[derive(Default)]
pub struct OneShotAlerts {
    pending: Mutex<HashMap<AlertHandle, PendingAlert>>,
}

impl OneShotAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of alerts currently scheduled.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Remove and return every alert due at `now`.
    fn take_due(&self, now: DateTime<Utc>) -> Vec<FiredAlert> {
        let Ok(mut pending) = self.pending.lock() else {
            return Vec::new();
        };
        let due: Vec<AlertHandle> = pending
            .iter()
            .filter(|(_, alert)| alert.fire_at <= now)
            .map(|(handle, _)| handle.clone())
            .collect();
        due.into_iter()
            .filter_map(|handle| {
                pending.remove(&handle).map(|alert| FiredAlert {
                    handle,
                    title: alert.title,
                    body: alert.body,
                    fire_at: alert.fire_at,
                })
            })
            .collect()
    }

    /// Run the fire loop until the delivery channel closes.
    ///
    /// Checks the registry every `poll_interval` and sends due alerts to
    /// `sender`. A large gap between ticks means the machine slept; due
    /// alerts accumulated in the gap fire immediately on wake.
    pub async fn run(&self, poll_interval: Duration, sender: mpsc::Sender<FiredAlert>) {
        let mut last_check = Utc::now();

        loop {
            tokio::time::sleep(poll_interval).await;

            let now = Utc::now();
            let time_jump = (now - last_check).num_seconds();
            if time_jump > TIME_JUMP_THRESHOLD_SECS {
                log::info!(
                    "Detected system wake (time jumped {} seconds), checking for due alerts",
                    time_jump
                );
            }

            for alert in self.take_due(now) {
                log::info!("Alert due: {} (scheduled for {})", alert.title, alert.fire_at);
                if sender.send(alert).await.is_err() {
                    log::error!("Alert delivery channel closed, stopping fire loop");
                    return;
                }
            }

            last_check = now;
        }
    }
}

impl AlertBackend for OneShotAlerts {
    fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        when: DateTime<Utc>,
    ) -> Result<AlertHandle, AlertError> {
        let handle = AlertHandle::generate();
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| AlertError::Backend("alert registry lock poisoned".to_string()))?;
        pending.insert(
            handle.clone(),
            PendingAlert {
                title: title.to_string(),
                body: body.to_string(),
                fire_at: when,
            },
        );
        Ok(handle)
    }

    fn cancel(&self, handle: &AlertHandle) -> Result<(), AlertError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| AlertError::Backend("alert registry lock poisoned".to_string()))?;
        match pending.remove(handle) {
            Some(_) => Ok(()),
            None => Err(AlertError::NotFound(handle.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn schedule_registers_a_pending_alert() {
        let alerts = OneShotAlerts::new();
        let when = Utc::now() + ChronoDuration::hours(1);

        let handle = alerts
            .schedule_one_shot("Replace Filter", "Time to replace your Filter.", when)
            .expect("schedule");

        assert_eq!(alerts.pending_count(), 1);
        alerts.cancel(&handle).expect("cancel");
        assert_eq!(alerts.pending_count(), 0);
    }

    #[test]
    fn cancel_unknown_handle_is_not_found() {
        let alerts = OneShotAlerts::new();
        let err = alerts
            .cancel(&AlertHandle::generate())
            .expect_err("unknown handle");
        assert!(err.is_ignorable());
    }

    #[test]
    fn cancel_is_not_idempotent_by_design() {
        let alerts = OneShotAlerts::new();
        let when = Utc::now() + ChronoDuration::hours(1);
        let handle = alerts
            .schedule_one_shot("Replace Mask", "Time to replace your Mask.", when)
            .expect("schedule");

        alerts.cancel(&handle).expect("first cancel");
        let err = alerts.cancel(&handle).expect_err("second cancel");
        assert!(matches!(err, AlertError::NotFound(_)));
    }

    #[test]
    fn take_due_returns_only_due_alerts() {
        let alerts = OneShotAlerts::new();
        let now = Utc::now();

        let due_handle = alerts
            .schedule_one_shot("Replace Hose", "Time to replace your Hose.", now - ChronoDuration::minutes(5))
            .expect("schedule past");
        alerts
            .schedule_one_shot("Replace Mask", "Time to replace your Mask.", now + ChronoDuration::hours(2))
            .expect("schedule future");

        let fired = alerts.take_due(now);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].handle, due_handle);
        assert_eq!(fired[0].title, "Replace Hose");

        // The fired alert is consumed; the future one remains.
        assert_eq!(alerts.pending_count(), 1);
        assert!(alerts.take_due(now).is_empty());
    }

    #[test]
    fn fired_alert_is_no_longer_cancellable() {
        let alerts = OneShotAlerts::new();
        let now = Utc::now();
        let handle = alerts
            .schedule_one_shot("Replace Filter", "Time to replace your Filter.", now)
            .expect("schedule");

        let fired = alerts.take_due(now);
        assert_eq!(fired.len(), 1);

        let err = alerts.cancel(&handle).expect_err("already fired");
        assert!(err.is_ignorable());
    }

    #[tokio::test]
    async fn fire_loop_delivers_due_alerts() {
        let alerts = std::sync::Arc::new(OneShotAlerts::new());
        alerts
            .schedule_one_shot(
                "Replace Filter",
                "Time to replace your Filter.",
                Utc::now() - ChronoDuration::seconds(1),
            )
            .expect("schedule");

        let (tx, mut rx) = mpsc::channel(4);
        let loop_alerts = alerts.clone();
        let fire_loop =
            tokio::spawn(async move { loop_alerts.run(Duration::from_millis(10), tx).await });

        let fired = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("fired within timeout")
            .expect("channel open");
        assert_eq!(fired.title, "Replace Filter");

        // Dropping the receiver stops the loop at its next delivery attempt.
        drop(rx);
        alerts
            .schedule_one_shot(
                "Replace Mask",
                "Time to replace your Mask.",
                Utc::now() - ChronoDuration::seconds(1),
            )
            .expect("schedule second");
        tokio::time::timeout(Duration::from_secs(2), fire_loop)
            .await
            .expect("loop exits")
            .expect("no panic");
    }
}
