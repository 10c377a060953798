use super::*;

use crate::seeds::SupplySeed;

impl SupplyDb {
    /// Helper: map a row to `DbSupply`.
    pub(crate) fn map_supply_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DbSupply> {
        Ok(DbSupply {
            id: row.get(0)?,
            key: row.get(1)?,
            label: row.get(2)?,
            interval_days: row.get(3)?,
            last_replaced: row.get(4)?,
            notify_hour: row.get(5)?,
            notify_minute: row.get(6)?,
            alert_handle: row.get(7)?,
        })
    }

    const SUPPLY_COLUMNS: &'static str =
        "id, key, label, interval_days, last_replaced, notify_hour, notify_minute, alert_handle";

    /// Insert a new supply. `last_replaced` is initialized to the creation
    /// instant and the key is generated from the label.
    pub fn create_supply(
        &self,
        label: &str,
        interval_days: u32,
        notify_hour: u32,
        notify_minute: u32,
    ) -> Result<DbSupply, DbError> {
        let now = Utc::now();
        let key = generated_key(label);
        self.conn.execute(
            "INSERT INTO supplies (key, label, interval_days, last_replaced, notify_hour, notify_minute)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                key,
                label,
                interval_days,
                now.to_rfc3339(),
                notify_hour,
                notify_minute
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_supply(id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a supply by ID.
    pub fn get_supply(&self, id: i64) -> Result<Option<DbSupply>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM supplies WHERE id = ?1",
            Self::SUPPLY_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], Self::map_supply_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get a supply by its unique key.
    pub fn get_supply_by_key(&self, key: &str) -> Result<Option<DbSupply>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM supplies WHERE key = ?1",
            Self::SUPPLY_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![key], Self::map_supply_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Get all supplies, ordered by label.
    pub fn get_all_supplies(&self) -> Result<Vec<DbSupply>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM supplies ORDER BY label ASC",
            Self::SUPPLY_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::map_supply_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Apply a partial update to the editable fields. Absent patch fields keep
    /// their current values. Returns the updated row, or None if the supply
    /// doesn't exist.
    pub fn update_supply(&self, id: i64, patch: &SupplyPatch) -> Result<Option<DbSupply>, DbError> {
        let Some(current) = self.get_supply(id)? else {
            return Ok(None);
        };

        let label = patch.label.as_deref().unwrap_or(&current.label);
        let interval_days = patch.interval_days.unwrap_or(current.interval_days);
        let notify_hour = patch.notify_hour.unwrap_or(current.notify_hour);
        let notify_minute = patch.notify_minute.unwrap_or(current.notify_minute);

        self.conn.execute(
            "UPDATE supplies SET label = ?1, interval_days = ?2, notify_hour = ?3, notify_minute = ?4
             WHERE id = ?5",
            params![label, interval_days, notify_hour, notify_minute, id],
        )?;
        self.get_supply(id)
    }

    /// Delete a supply. Returns true if a row was removed.
    pub fn delete_supply(&self, id: i64) -> Result<bool, DbError> {
        let affected = self
            .conn
            .execute("DELETE FROM supplies WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    /// Reset `last_replaced` to the current instant. Returns true if the
    /// supply exists.
    pub fn mark_replaced_now(&self, id: i64) -> Result<bool, DbError> {
        let now = Utc::now().to_rfc3339();
        let affected = self.conn.execute(
            "UPDATE supplies SET last_replaced = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        Ok(affected > 0)
    }

    /// Store (or clear) the outstanding alert handle for a supply.
    pub fn set_alert_handle(&self, id: i64, handle: Option<&str>) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE supplies SET alert_handle = ?1 WHERE id = ?2",
            params![handle, id],
        )?;
        Ok(())
    }

    /// Insert-if-absent for the built-in defaults, keyed on `key`. Returns
    /// the number of rows actually inserted.
    pub fn seed_defaults(&self, seeds: &[SupplySeed]) -> Result<usize, DbError> {
        let now = Utc::now().to_rfc3339();
        let mut inserted = 0;
        for seed in seeds {
            inserted += self.conn.execute(
                "INSERT OR IGNORE INTO supplies (key, label, interval_days, last_replaced, notify_hour, notify_minute)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    seed.key,
                    seed.label,
                    seed.interval_days,
                    now,
                    seed.notify_hour,
                    seed.notify_minute
                ],
            )?;
        }
        Ok(inserted)
    }
}

/// Key for a user-created supply: slugified label plus a short random suffix.
/// Runs of non-alphanumeric characters collapse to a single dash.
fn generated_key(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut prev_dash = false;
    for c in label.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(8);
    format!("{}-{}", slug, suffix)
}

#[cfg(test)]
mod tests {
    use super::generated_key;

    #[test]
    fn generated_key_slugifies_label() {
        let key = generated_key("Tube & Clip");
        let (slug, suffix) = key.rsplit_once('-').expect("suffix");
        assert_eq!(slug, "tube-clip");
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn generated_keys_differ_for_same_label() {
        assert_ne!(generated_key("Filter"), generated_key("Filter"));
    }
}
