//! Reminder lifecycle coordination.
//!
//! Keeps the single outstanding alert per supply consistent with its persisted
//! state. Every mutation that can move the due date runs the same sequence:
//! cancel the previous alert, clear the stored handle, recompute the due date
//! from persisted fields, schedule a new one-shot alert, persist the handle.
//! Deletion runs only the cancel half. Scheduling failures disable the
//! reminder but never fail the surrounding mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::alerts::{AlertBackend, AlertHandle};
use crate::db::{DbError, DbSupply, SupplyDb, SupplyPatch};
use crate::due;
use crate::notification::{replacement_body, replacement_title};
use crate::seeds::DEFAULT_SUPPLIES;

/// Placeholder for blank or whitespace-only labels.
const UNTITLED_LABEL: &str = "Untitled";

pub struct ReminderService {
    db: SupplyDb,
    alerts: Arc<dyn AlertBackend>,
}

impl ReminderService {
    pub fn new(db: SupplyDb, alerts: Arc<dyn AlertBackend>) -> Self {
        Self { db, alerts }
    }

    /// Borrow the underlying store for read-only queries.
    pub fn db(&self) -> &SupplyDb {
        &self.db
    }

    /// Insert-if-absent of the built-in defaults.
    pub fn seed_defaults(&self) -> Result<usize, DbError> {
        let inserted = self.db.seed_defaults(DEFAULT_SUPPLIES)?;
        if inserted > 0 {
            log::info!("Seeded {} default supplies", inserted);
        }
        Ok(inserted)
    }

    /// All supplies, ordered by label.
    pub fn list(&self) -> Result<Vec<DbSupply>, DbError> {
        self.db.get_all_supplies()
    }

    pub fn get(&self, id: i64) -> Result<Option<DbSupply>, DbError> {
        self.db.get_supply(id)
    }

    /// Create a supply and arm its first alert.
    pub fn create(
        &self,
        label: &str,
        interval_days: u32,
        notify_hour: u32,
        notify_minute: u32,
    ) -> Result<DbSupply, DbError> {
        let label = normalize_label(label);
        let created = self
            .db
            .create_supply(&label, interval_days, notify_hour, notify_minute)?;
        Ok(self.reschedule_for(created.id)?.unwrap_or(created))
    }

    /// Edit the label, interval, or notify time. Returns None when the supply
    /// doesn't exist.
    pub fn update(&self, id: i64, patch: SupplyPatch) -> Result<Option<DbSupply>, DbError> {
        let patch = SupplyPatch {
            label: patch.label.map(|label| normalize_label(&label)),
            interval_days: patch.interval_days,
            notify_hour: patch.notify_hour,
            notify_minute: patch.notify_minute,
        };
        match self.db.update_supply(id, &patch)? {
            None => Ok(None),
            Some(_) => self.reschedule_for(id),
        }
    }

    /// Reset `last_replaced` to now and re-arm the alert. The due date is
    /// recomputed from the row read back from the store, not the in-memory
    /// timestamp, so it reflects exactly what was committed.
    pub fn mark_replaced(&self, id: i64) -> Result<Option<DbSupply>, DbError> {
        if !self.db.mark_replaced_now(id)? {
            return Ok(None);
        }
        self.reschedule_for(id)
    }

    /// Remove a supply, cancelling any outstanding alert first.
    pub fn delete(&self, id: i64) -> Result<bool, DbError> {
        let Some(current) = self.db.get_supply(id)? else {
            return Ok(false);
        };
        if let Some(handle) = current.alert_handle {
            self.cancel_quietly(&AlertHandle::from(handle));
        }
        self.db.delete_supply(id)
    }

    /// The invariant-bearing sequence: cancel → clear → recompute →
    /// schedule → persist. Returns the refreshed row, or None when the supply
    /// doesn't exist.
    pub fn reschedule_for(&self, id: i64) -> Result<Option<DbSupply>, DbError> {
        let Some(current) = self.db.get_supply(id)? else {
            return Ok(None);
        };

        if let Some(handle) = &current.alert_handle {
            self.cancel_quietly(&AlertHandle::from(handle.clone()));
        }
        self.db.set_alert_handle(id, None)?;

        let due = next_due(&current);
        match self.alerts.schedule_one_shot(
            &replacement_title(&current.label),
            &replacement_body(&current.label),
            due,
        ) {
            Ok(handle) => self.db.set_alert_handle(id, Some(handle.as_str()))?,
            Err(e) => log::warn!(
                "Failed to schedule alert for '{}': {}. Reminder disabled until the next reschedule.",
                current.label,
                e
            ),
        }

        self.db.get_supply(id)
    }

    /// Re-arm every supply. Run at startup: the in-process registry starts
    /// empty, so persisted handles from the previous run are stale by
    /// construction. Returns how many supplies ended up armed.
    pub fn reschedule_all(&self) -> Result<usize, DbError> {
        let supplies = self.db.get_all_supplies()?;
        let mut armed = 0;
        for supply in supplies {
            let refreshed = self.reschedule_for(supply.id)?;
            if refreshed.is_some_and(|s| s.alert_handle.is_some()) {
                armed += 1;
            }
        }
        Ok(armed)
    }

    fn cancel_quietly(&self, handle: &AlertHandle) {
        match self.alerts.cancel(handle) {
            Ok(()) => {}
            Err(e) if e.is_ignorable() => {
                log::debug!("Previous alert {} already gone: {}", handle, e)
            }
            Err(e) => log::warn!("Failed to cancel alert {}: {}", handle, e),
        }
    }
}

/// Projected (unclamped) due instant for a supply row.
pub fn projected_due(supply: &DbSupply) -> DateTime<Utc> {
    due::projected_due_date(
        parse_last_replaced(supply),
        supply.interval_days,
        supply.notify_hour,
        supply.notify_minute,
    )
    .unwrap_or_else(Utc::now)
}

fn next_due(supply: &DbSupply) -> DateTime<Utc> {
    due::next_due_date(
        parse_last_replaced(supply),
        supply.interval_days,
        supply.notify_hour,
        supply.notify_minute,
    )
}

fn parse_last_replaced(supply: &DbSupply) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(&supply.last_replaced) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            log::warn!(
                "Unparseable last_replaced for '{}' ({}), treating as now",
                supply.label,
                e
            );
            Utc::now()
        }
    }
}

fn normalize_label(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        UNTITLED_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}
