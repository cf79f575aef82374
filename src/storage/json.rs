//! JSON file-based storage backend.
//!
//! This module provides a simple, human-readable table store used when no
//! remote store is configured. It uses atomic file writes (write-to-temp +
//! rename) to prevent corruption on crashes.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(1) - loads entire file into memory once
//! - **Select**: O(n) - every row of the table is tested against the query
//! - **Write**: O(n) - serializes and writes entire dataset
//! - **Best for**: demos and offline use, a few thousand rows

use crate::domain::error::{HirafiError, Result};
use crate::remote::{StoreCommand, StoreOutcome};
use crate::storage::backend::TableStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// JSON storage container format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    /// Version of the storage format for future migrations.
    version: u32,

    /// Next identifier handed to an inserted row without one.
    #[serde(default = "first_id")]
    next_id: u64,

    /// Rows per table name.
    #[serde(default)]
    tables: BTreeMap<String, Vec<Value>>,
}

const fn first_id() -> u64 {
    1
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: 1,
            next_id: first_id(),
            tables: BTreeMap::new(),
        }
    }
}

/// JSON file table store.
///
/// The entire dataset is kept in memory. A change is applied to a copy, the
/// copy is written to disk, and only a successful write replaces the cached
/// data, so a failed command leaves both the file and the cache untouched.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`. It's designed to be used from a single
/// worker thread, matching the Zellij plugin architecture.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "next_id": 3,
///   "tables": {
///     "users": [
///       { "id": "1", "first_name": "Karim", "role": "worker", "wilaya": "Oran" }
///     ],
///     "bookings": [
///       { "id": "2", "seeker_id": "5", "status": "pending", "created_at": "..." }
///     ]
///   }
/// }
/// ```
pub struct JsonStorage {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    /// In-memory data cache, always equal to the file's last written state.
    data: StorageData,
}

impl JsonStorage {
    /// Creates or opens a JSON table store.
    ///
    /// If the file exists, loads existing data. Otherwise starts empty.
    /// Parent directories are created automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - File exists but contains invalid JSON
    /// - File permissions prevent reading
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON table storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty storage");
            StorageData::default()
        };

        tracing::debug!(
            table_count = data.tables.len(),
            row_count = data.tables.values().map(Vec::len).sum::<usize>(),
            "storage initialized"
        );

        Ok(Self { file_path, data })
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| HirafiError::Storage(format!("failed to parse JSON: {e}")))?;

        tracing::debug!(version = data.version, "loaded storage data");
        Ok(data)
    }

    /// Writes `next` to disk, then makes it the cached data.
    fn commit(&mut self, next: StorageData) -> Result<()> {
        let json = serde_json::to_string_pretty(&next)
            .map_err(|e| HirafiError::Storage(format!("failed to serialize JSON: {e}")))?;
        write_atomic(&self.file_path, &json)?;

        self.data = next;
        tracing::debug!(path = ?self.file_path, "storage saved");
        Ok(())
    }

    fn select(&self, query: &crate::query::Query) -> Vec<Value> {
        self.data
            .tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default()
    }

    fn insert(&mut self, table: &str, record: &Value) -> Result<Value> {
        let Value::Object(fields) = record else {
            return Err(HirafiError::Storage(format!(
                "cannot insert non-object record into {table}"
            )));
        };

        let mut next = self.data.clone();
        let mut row = fields.clone();
        if row.get("id").map_or(true, Value::is_null) {
            row.insert("id".to_string(), Value::String(next.next_id.to_string()));
            next.next_id = next.next_id.saturating_add(1);
        }

        let row = Value::Object(row);
        next.tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        self.commit(next)?;
        Ok(row)
    }

    fn transition(
        &mut self,
        table: &str,
        id: &str,
        from: &str,
        to: &str,
        assign: &BTreeMap<String, Value>,
    ) -> Result<usize> {
        let mut next = self.data.clone();
        let mut affected = 0;
        for row in next.tables.get_mut(table).into_iter().flatten() {
            let Value::Object(fields) = row else { continue };
            let id_matches = fields.get("id").is_some_and(|v| id_text(v) == Some(id.to_string()));
            let status_matches = fields.get("status").and_then(Value::as_str) == Some(from);
            if id_matches && status_matches {
                fields.insert("status".to_string(), Value::String(to.to_string()));
                for (column, value) in assign {
                    fields.insert(column.clone(), value.clone());
                }
                affected += 1;
            }
        }

        if affected > 0 {
            self.commit(next)?;
        }
        Ok(affected)
    }
}

impl TableStore for JsonStorage {
    fn execute(&mut self, command: &StoreCommand) -> Result<StoreOutcome> {
        let _span = tracing::debug_span!("json_execute", command = command.name()).entered();

        let outcome = match command {
            StoreCommand::Select(query) => StoreOutcome::Rows(self.select(query)),
            StoreCommand::Insert { table, record } => {
                StoreOutcome::Rows(vec![self.insert(table, record)?])
            }
            StoreCommand::Transition {
                table,
                id,
                from,
                to,
                assign,
            } => StoreOutcome::Affected(self.transition(table, id, from, to, assign)?),
        };

        tracing::debug!(affected = outcome.affected(), "command executed");
        Ok(outcome)
    }
}

/// Writes `contents` next to `path` and renames it into place.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = path.with_extension("tmp");
    tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Predicate, Query};
    use serde_json::json;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> JsonStorage {
        JsonStorage::new(dir.path().join("tables.json")).unwrap()
    }

    fn insert(storage: &mut JsonStorage, table: &str, record: Value) -> Value {
        storage
            .execute(&StoreCommand::Insert {
                table: table.to_string(),
                record,
            })
            .unwrap()
            .into_rows()
            .remove(0)
    }

    #[test]
    fn insert_assigns_ids_and_persists() {
        let dir = TempDir::new().unwrap();
        {
            let mut storage = open(&dir);
            let row = insert(&mut storage, "users", json!({"first_name": "Karim"}));
            assert_eq!(row["id"], "1");
            let row = insert(&mut storage, "users", json!({"id": "u-9", "first_name": "Lina"}));
            assert_eq!(row["id"], "u-9");
        }

        let storage = open(&dir);
        let rows = storage.select(&Query::new("users"));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn select_applies_predicates() {
        let dir = TempDir::new().unwrap();
        let mut storage = open(&dir);
        insert(&mut storage, "users", json!({"role": "worker", "wilaya": "Oran"}));
        insert(&mut storage, "users", json!({"role": "worker", "wilaya": "Algiers"}));

        let query = Query::new("users").with(Predicate::eq("wilaya", "Algiers"));
        let rows = storage.execute(&StoreCommand::Select(query)).unwrap().into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["wilaya"], "Algiers");
    }

    #[test]
    fn unknown_table_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let storage = open(&dir);
        assert!(storage.select(&Query::new("jobs")).is_empty());
    }

    #[test]
    fn non_object_records_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut storage = open(&dir);
        let result = storage.execute(&StoreCommand::Insert {
            table: "users".to_string(),
            record: json!([1, 2]),
        });
        assert!(matches!(result, Err(HirafiError::Storage(_))));
    }

    #[test]
    fn transition_is_guarded_on_current_status() {
        let dir = TempDir::new().unwrap();
        let mut storage = open(&dir);
        let booking = insert(&mut storage, "bookings", json!({"status": "pending"}));
        let id = booking["id"].as_str().unwrap().to_string();

        let accept = StoreCommand::Transition {
            table: "bookings".to_string(),
            id,
            from: "pending".to_string(),
            to: "accepted".to_string(),
            assign: BTreeMap::from([("worker_id".to_string(), json!("w-1"))]),
        };

        assert_eq!(storage.execute(&accept).unwrap(), StoreOutcome::Affected(1));
        assert_eq!(storage.execute(&accept).unwrap(), StoreOutcome::Affected(0));

        let rows = storage.select(&Query::new("bookings"));
        assert_eq!(rows[0]["status"], "accepted");
        assert_eq!(rows[0]["worker_id"], "w-1");
    }

    #[test]
    fn failed_write_leaves_no_trace() {
        let dir = TempDir::new().unwrap();
        let mut storage = open(&dir);
        let booking = insert(&mut storage, "bookings", json!({"status": "pending"}));
        let id = booking["id"].as_str().unwrap().to_string();

        // A directory in the temp file's place makes every write fail.
        let blocker = dir.path().join("tables.tmp");
        std::fs::create_dir(&blocker).unwrap();

        let result = storage.execute(&StoreCommand::Insert {
            table: "bookings".to_string(),
            record: json!({"status": "pending"}),
        });
        assert!(result.is_err());

        let accept = StoreCommand::Transition {
            table: "bookings".to_string(),
            id,
            from: "pending".to_string(),
            to: "accepted".to_string(),
            assign: BTreeMap::new(),
        };
        assert!(storage.execute(&accept).is_err());

        let rows = storage.select(&Query::new("bookings"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["status"], "pending");

        std::fs::remove_dir(&blocker).unwrap();
        assert_eq!(storage.execute(&accept).unwrap(), StoreOutcome::Affected(1));
        let row = insert(&mut storage, "bookings", json!({"status": "pending"}));
        assert_eq!(row["id"], "2");
        drop(storage);

        let reopened = open(&dir);
        let rows = reopened.select(&Query::new("bookings"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["status"], "accepted");
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tables.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonStorage::new(path), Err(HirafiError::Storage(_))));
    }
}
