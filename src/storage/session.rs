//! Session slot persisted as a single JSON file.

use crate::domain::error::{HirafiError, Result};
use crate::domain::User;
use crate::storage::backend::SessionStore;
use crate::storage::json::write_atomic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// On-disk envelope around the stored user.
#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    user: User,
    saved_at: chrono::DateTime<chrono::Utc>,
}

/// Stores the logged-in user in `session.json`.
pub struct JsonSessionStore {
    file_path: PathBuf,
}

impl JsonSessionStore {
    /// Opens the slot at `file_path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn new(file_path: PathBuf) -> Result<Self> {
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { file_path })
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<Option<User>> {
        if !self.file_path.exists() {
            tracing::debug!("no stored session");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.file_path)?;
        let file: SessionFile = serde_json::from_str(&contents)
            .map_err(|e| HirafiError::Storage(format!("failed to parse session: {e}")))?;
        tracing::debug!(user_id = %file.user.id, saved_at = %file.saved_at, "session loaded");
        Ok(Some(file.user))
    }

    fn save(&mut self, user: &User) -> Result<()> {
        let file = SessionFile {
            version: 1,
            user: user.clone(),
            saved_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| HirafiError::Storage(format!("failed to serialize session: {e}")))?;
        write_atomic(&self.file_path, &json)?;
        tracing::debug!(user_id = %user.id, "session saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.file_path) {
            Ok(()) => {
                tracing::debug!("session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, Role};
    use tempfile::TempDir;

    #[test]
    fn save_then_load_round_trips_identity() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonSessionStore::new(dir.path().join("session.json")).unwrap();

        let mut user = User::new("u-1", "Amina", "Khelifi", "0550123456", Role::Seeker);
        user.location = Location {
            region: "Blida".to_string(),
            sub_region: None,
        };
        store.save(&user).unwrap();

        assert_eq!(store.load().unwrap(), Some(user));
    }

    #[test]
    fn clear_removes_the_slot_and_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonSessionStore::new(dir.path().join("session.json")).unwrap();
        store
            .save(&User::new("u-1", "A", "B", "0", Role::Worker))
            .unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
