//! resupply daemon.
//!
//! Launch sequence: open the store (fatal on failure), seed the built-in
//! defaults, re-arm one alert per supply, then run the fire loop until
//! interrupted, delivering due reminders through the notifier.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use resupply::alerts::oneshot::DEFAULT_POLL_INTERVAL_SECS;
use resupply::alerts::OneShotAlerts;
use resupply::config::Config;
use resupply::db::SupplyDb;
use resupply::due;
use resupply::notification::{LogNotifier, Notifier};
use resupply::reminders::{projected_due, ReminderService};

/// Channel buffer size for fired alerts
const ALERT_CHANNEL_SIZE: usize = 32;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            Config::default()
        }
    };

    let db = match config.db_path() {
        Some(path) => SupplyDb::open_at(path),
        None => SupplyDb::open(),
    };
    let db = match db {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open supply database: {e}");
            std::process::exit(1);
        }
    };

    let alerts = Arc::new(OneShotAlerts::new());
    let service = ReminderService::new(db, alerts.clone());

    if let Err(e) = service.seed_defaults() {
        eprintln!("Failed to seed default supplies: {e}");
        std::process::exit(1);
    }

    match service.reschedule_all() {
        Ok(armed) => log::info!("Armed {} reminder(s)", armed),
        Err(e) => {
            eprintln!("Failed to arm reminders: {e}");
            std::process::exit(1);
        }
    }

    log_due_summary(&service);

    let (alert_tx, mut alert_rx) = mpsc::channel(ALERT_CHANNEL_SIZE);
    let poll_interval =
        Duration::from_secs(config.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS));
    let fire_alerts = alerts.clone();
    tokio::spawn(async move {
        fire_alerts.run(poll_interval, alert_tx).await;
    });

    let delivery = tokio::spawn(async move {
        let notifier = LogNotifier;
        while let Some(alert) = alert_rx.recv().await {
            if let Err(e) = notifier.notify(&alert.title, &alert.body) {
                log::warn!("Failed to deliver reminder '{}': {}", alert.title, e);
            }
        }
    });

    log::info!("resupply running; press Ctrl-C to exit");
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
    delivery.abort();
    log::info!("Shutting down");
}

/// Log one line per supply with its projected due status.
fn log_due_summary(service: &ReminderService) {
    let supplies = match service.list() {
        Ok(supplies) => supplies,
        Err(e) => {
            log::warn!("Failed to list supplies: {}", e);
            return;
        }
    };
    let now = chrono::Utc::now();
    for supply in &supplies {
        let status = due::due_status(projected_due(supply), now);
        log::info!(
            "{}: every {} days, {}",
            supply.label,
            supply.interval_days,
            status
        );
    }
}
