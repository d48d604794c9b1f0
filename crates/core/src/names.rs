//! Local patient-name store.
//!
//! The only durable state the relay owns: a mapping from the queue-assigner's
//! patient id to the full name entered at the kiosk. Records are created once,
//! never updated, and removed when the patient is called.
//!
//! ## Storage Layout
//!
//! A single sled tree ([`NAME_TREE`]) keyed by the raw patient id bytes. Values are
//! JSON-encoded [`NameRecord`]s:
//!
//! ```text
//! "abc123" -> {"patient_id":"abc123","fullName":"Jane Doe","registered_at":"2024-05-01T10:00:00Z"}
//! ```

use crate::constants::NAME_TREE;
use crate::{KioskError, KioskResult};
use chrono::{DateTime, Utc};
use kiosk_types::{NonEmptyText, PatientId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One stored name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRecord {
    pub patient_id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub registered_at: DateTime<Utc>,
}

/// sled-backed store of patient names.
///
/// Cloning is cheap and clones share the same underlying tree.
#[derive(Clone, Debug)]
pub struct NameStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl NameStore {
    /// Opens (or creates) the store under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `KioskError::Store` if the database cannot be opened, for example
    /// because another process holds its lock.
    pub fn open(dir: &Path) -> KioskResult<Self> {
        let db = sled::open(dir)?;
        Self::from_db(db)
    }

    /// Opens a store that lives only as long as the process.
    pub fn temporary() -> KioskResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> KioskResult<Self> {
        let tree = db.open_tree(NAME_TREE)?;
        Ok(Self { db, tree })
    }

    /// Binds `full_name` to `id` unless the id is already bound.
    ///
    /// Returns `false`, leaving the existing record untouched, when `id` already has a name.
    pub fn insert_if_absent(&self, id: &PatientId, full_name: &NonEmptyText) -> KioskResult<bool> {
        let record = NameRecord {
            patient_id: id.as_str().to_string(),
            full_name: full_name.as_str().to_string(),
            registered_at: Utc::now(),
        };
        let value = serde_json::to_vec(&record).map_err(KioskError::StoreEncode)?;

        let swapped = self
            .tree
            .compare_and_swap(id.as_str(), None as Option<&[u8]>, Some(value))?;
        Ok(swapped.is_ok())
    }

    /// The record stored for `id`, if any.
    pub fn get(&self, id: &str) -> KioskResult<Option<NameRecord>> {
        self.tree
            .get(id)?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// The full name stored for `id`, if any.
    pub fn name_of(&self, id: &str) -> KioskResult<Option<String>> {
        Ok(self.get(id)?.map(|record| record.full_name))
    }

    /// Whether a record exists for `id`, without decoding it.
    ///
    /// # Returns
    /// `true` even if the stored record is corrupt.
    pub fn contains(&self, id: &str) -> KioskResult<bool> {
        Ok(self.tree.contains_key(id)?)
    }

    /// Every stored record, ordered by patient id.
    pub fn records(&self) -> KioskResult<Vec<NameRecord>> {
        self.tree
            .iter()
            .values()
            .map(|value| decode(&value?))
            .collect()
    }

    /// Snapshot of all names keyed by patient id.
    pub fn names(&self) -> KioskResult<HashMap<String, String>> {
        Ok(self
            .records()?
            .into_iter()
            .map(|record| (record.patient_id, record.full_name))
            .collect())
    }

    /// Deletes the record for `id`. Returns whether a record existed.
    pub fn remove(&self, id: &str) -> KioskResult<bool> {
        Ok(self.tree.remove(id)?.is_some())
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Waits until all writes so far are durable on disk.
    pub async fn flush(&self) -> KioskResult<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[cfg(test)]
impl NameStore {
    pub(crate) fn insert_raw(&self, id: &str, bytes: &[u8]) -> KioskResult<()> {
        self.tree.insert(id, bytes)?;
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> KioskResult<NameRecord> {
    serde_json::from_slice(bytes).map_err(KioskError::StoreDecode)
}
