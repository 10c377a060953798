//! Due-date computation for supply replacement reminders.
//!
//! The projection adds the replacement interval to the last-replaced instant
//! and pins the configured local time-of-day. Scheduling uses the clamped
//! variant: a projection that is not strictly in the future becomes "one
//! minute from now", because the alert backend rejects or immediately fires
//! past-dated triggers.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};

/// Classification of a supply's projected due date relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Upcoming { days_left: i64 },
    DueToday,
    Overdue { days: i64 },
}

impl std::fmt::Display for DueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DueStatus::Upcoming { days_left: 1 } => write!(f, "1 day left"),
            DueStatus::Upcoming { days_left } => write!(f, "{} days left", days_left),
            DueStatus::DueToday => write!(f, "replace today"),
            DueStatus::Overdue { days: 1 } => write!(f, "overdue by 1 day"),
            DueStatus::Overdue { days } => write!(f, "overdue by {} days", days),
        }
    }
}

/// Next instant a supply should be replaced: `last_replaced + interval_days`
/// at `(hour, minute)` local time, clamped to one minute from now when the
/// projection is already past.
pub fn next_due_date(
    last_replaced: DateTime<Utc>,
    interval_days: u32,
    hour: u32,
    minute: u32,
) -> DateTime<Utc> {
    next_due_date_at(Utc::now(), last_replaced, interval_days, hour, minute)
}

/// Deterministic variant of [`next_due_date`] with an explicit "now".
pub fn next_due_date_at(
    now: DateTime<Utc>,
    last_replaced: DateTime<Utc>,
    interval_days: u32,
    hour: u32,
    minute: u32,
) -> DateTime<Utc> {
    match projected_due_date(last_replaced, interval_days, hour, minute) {
        Some(due) if due > now => due,
        _ => now + Duration::minutes(1),
    }
}

/// Unclamped projection: interval added, local time-of-day pinned.
///
/// Returns `None` only when the local wall-clock time does not exist (DST
/// spring-forward gap) even after nudging one hour later.
pub fn projected_due_date(
    last_replaced: DateTime<Utc>,
    interval_days: u32,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    let day = (last_replaced + Duration::days(interval_days as i64))
        .with_timezone(&Local)
        .date_naive();
    // Out-of-range time-of-day falls back to midnight.
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let naive = day.and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| Local.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Classify `due` relative to `now` in whole 24-hour steps, floor semantics:
/// anything between one second and a full day past is already "overdue by 1".
pub fn due_status(due: DateTime<Utc>, now: DateTime<Utc>) -> DueStatus {
    let days = (due - now).num_seconds().div_euclid(86_400);
    if days > 0 {
        DueStatus::Upcoming { days_left: days }
    } else if days == 0 {
        DueStatus::DueToday
    } else {
        DueStatus::Overdue { days: -days }
    }
}
