//! Key-value state operations: patient snapshot and login flag.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};
use crate::models::PatientRecord;

/// Storage key for the JSON-serialized record list.
pub const KEY_PATIENTS: &str = "patients";

/// Storage key for the login flag; the stored value is the literal `"true"`.
pub const KEY_LOGGED_IN: &str = "isLoggedIn";

impl Database {
    /// Read a state value by key.
    pub fn get_state(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Write a state value, replacing any previous one.
    pub fn set_state(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a state value.
    pub fn delete_state(&self, key: &str) -> DbResult<()> {
        self.conn
            .execute("DELETE FROM app_state WHERE key = ?", [key])?;
        Ok(())
    }

    /// Load the stored record list.
    ///
    /// An absent key or an unparseable snapshot both yield an empty list;
    /// corruption is treated as "no data", not a fatal error.
    pub fn load_patients(&self) -> DbResult<Vec<PatientRecord>> {
        let Some(raw) = self.get_state(KEY_PATIENTS)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                log::warn!("discarding unparseable patient snapshot: {}", err);
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the stored record list with the given sequence.
    pub fn save_patients(&self, records: &[PatientRecord]) -> DbResult<()> {
        let blob = serde_json::to_string(records)?;
        self.set_state(KEY_PATIENTS, &blob)
    }

    /// True only when the stored flag is the literal `"true"`.
    pub fn is_logged_in(&self) -> DbResult<bool> {
        Ok(self.get_state(KEY_LOGGED_IN)?.as_deref() == Some("true"))
    }

    /// Set the login flag.
    pub fn set_logged_in(&self) -> DbResult<()> {
        self.set_state(KEY_LOGGED_IN, "true")
    }

    /// Clear the login flag.
    pub fn clear_logged_in(&self) -> DbResult<()> {
        self.delete_state(KEY_LOGGED_IN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EyeMeasurement, PatientCandidate};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn record(name: &str, mobile: &str) -> PatientRecord {
        let candidate = PatientCandidate {
            date: "2024-03-01".into(),
            name: name.into(),
            mobile: mobile.into(),
            right_eye: EyeMeasurement::default(),
            left_eye: EyeMeasurement::default(),
            frame_price: "500".into(),
            glass_price: "250".into(),
            remarks: "checkup".into(),
        };
        PatientRecord::from_candidate(candidate.validate_for_create().unwrap())
    }

    #[test]
    fn test_state_roundtrip() {
        let db = setup_db();
        assert_eq!(db.get_state("missing").unwrap(), None);

        db.set_state("k", "v1").unwrap();
        assert_eq!(db.get_state("k").unwrap(), Some("v1".into()));

        db.set_state("k", "v2").unwrap();
        assert_eq!(db.get_state("k").unwrap(), Some("v2".into()));

        db.delete_state("k").unwrap();
        assert_eq!(db.get_state("k").unwrap(), None);
    }

    #[test]
    fn test_save_and_load_patients() {
        let db = setup_db();

        let records = vec![record("Asha", "9771234567"), record("Ravi", "8881234567")];
        db.save_patients(&records).unwrap();

        let loaded = db.load_patients().unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_load_empty_store() {
        let db = setup_db();
        assert!(db.load_patients().unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt_snapshot_is_empty() {
        let db = setup_db();
        db.set_state(KEY_PATIENTS, "{not json").unwrap();
        assert!(db.load_patients().unwrap().is_empty());

        db.set_state(KEY_PATIENTS, r#"[{"id": "only-an-id"}]"#).unwrap();
        assert!(db.load_patients().unwrap().is_empty());
    }

    #[test]
    fn test_login_flag() {
        let db = setup_db();
        assert!(!db.is_logged_in().unwrap());

        db.set_logged_in().unwrap();
        assert!(db.is_logged_in().unwrap());

        db.clear_logged_in().unwrap();
        assert!(!db.is_logged_in().unwrap());

        // Only the literal "true" counts
        db.set_state(KEY_LOGGED_IN, "yes").unwrap();
        assert!(!db.is_logged_in().unwrap());
    }
}
