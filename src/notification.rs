//! Notification delivery wrapper.
//!
//! Renders fired alerts to the user. The engine ships a log-backed notifier;
//! a desktop shell can substitute its own implementation at the same seam.

/// Delivery target for fired alerts.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str) -> Result<(), String>;
}

/// Notifier that writes alerts to the application log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), String> {
        log::info!("[reminder] {}: {}", title, body);
        Ok(())
    }
}

/// Title for a replacement reminder.
pub fn replacement_title(label: &str) -> String {
    format!("Replace {}", label)
}

/// Body for a replacement reminder.
pub fn replacement_body(label: &str) -> String {
    format!("Time to replace your {}.", label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_message_derivation() {
        assert_eq!(replacement_title("Nose Cushion"), "Replace Nose Cushion");
        assert_eq!(
            replacement_body("Nose Cushion"),
            "Time to replace your Nose Cushion."
        );
    }

    #[test]
    fn log_notifier_accepts_messages() {
        LogNotifier
            .notify("Replace Filter", "Time to replace your Filter.")
            .expect("log delivery");
    }
}
