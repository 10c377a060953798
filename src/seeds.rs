//! Built-in supply set seeded on first launch.
//!
//! Seeding is insert-if-absent keyed on `key`, so a deleted default reappears
//! on the next launch while edits to a surviving row are left alone.

/// Declarative spec for one default supply.
#[derive(Debug, Clone, Copy)]
pub struct SupplySeed {
    pub key: &'static str,
    pub label: &'static str,
    pub interval_days: u32,
    pub notify_hour: u32,
    pub notify_minute: u32,
}

/// The default CPAP consumables, evening reminder at 21:00 local.
pub const DEFAULT_SUPPLIES: &[SupplySeed] = &[
    SupplySeed { key: "Mask", label: "Mask", interval_days: 30, notify_hour: 21, notify_minute: 0 },
    SupplySeed { key: "Nose Cushion", label: "Nose Cushion", interval_days: 7, notify_hour: 21, notify_minute: 0 },
    SupplySeed { key: "Hose", label: "Hose", interval_days: 90, notify_hour: 21, notify_minute: 0 },
    SupplySeed { key: "Water Supply", label: "Water Supply", interval_days: 7, notify_hour: 21, notify_minute: 0 },
    SupplySeed { key: "Filter", label: "Filter", interval_days: 7, notify_hour: 21, notify_minute: 0 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_are_unique() {
        let mut keys: Vec<&str> = DEFAULT_SUPPLIES.iter().map(|s| s.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), DEFAULT_SUPPLIES.len());
    }

    #[test]
    fn default_times_are_valid() {
        for seed in DEFAULT_SUPPLIES {
            assert!(seed.notify_hour < 24, "{}", seed.key);
            assert!(seed.notify_minute < 60, "{}", seed.key);
        }
    }
}
