//! Session storage
//!
//! The whole collection lives in one JSON file, rewritten after every mutation:
//! - Sessions: ~/.local/share/interlog/sessions.json
//!
//! The file holds `{"version": 1, "sessions": [...]}`. A bare array (the
//! unversioned shape) is still accepted on load.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::Session;

/// Current on-disk schema version
pub const SCHEMA_VERSION: u64 = 1;

#[derive(Serialize)]
struct Snapshot<'a> {
    version: u64,
    sessions: &'a [Session],
}

/// Owner of the canonical session list and the only writer of the file
pub struct SessionStore {
    path: PathBuf,
    /// Newest entries first
    sessions: Vec<Session>,
}

impl SessionStore {
    /// Open the store backed by `path`, creating its directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let sessions = Self::load(path);
        tracing::debug!(path = %path.display(), count = sessions.len(), "loaded sessions");

        Ok(Self {
            path: path.to_path_buf(),
            sessions,
        })
    }

    /// Read the persisted collection. Never fails: unreadable or corrupt
    /// state is logged and treated as empty, bad records are skipped.
    pub fn load(path: &Path) -> Vec<Session> {
        if !path.exists() {
            return Vec::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read sessions, starting empty");
                return Vec::new();
            }
        };

        if content.trim().is_empty() {
            return Vec::new();
        }

        let value: Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse sessions, starting empty");
                return Vec::new();
            }
        };

        let records = match value {
            Value::Array(records) => records,
            Value::Object(mut map) => {
                let version = map.get("version").and_then(Value::as_u64).unwrap_or(0);
                if version > SCHEMA_VERSION {
                    tracing::warn!(version, "sessions file is from a newer version, loading best-effort");
                }
                match map.remove("sessions") {
                    Some(Value::Array(records)) => records,
                    _ => {
                        tracing::warn!(path = %path.display(), "sessions file has no session list, starting empty");
                        return Vec::new();
                    }
                }
            }
            _ => {
                tracing::warn!(path = %path.display(), "unexpected sessions file shape, starting empty");
                return Vec::new();
            }
        };

        let mut sessions = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Session>(record) {
                Ok(session) if session.is_consistent() => sessions.push(session),
                Ok(session) => {
                    // Log but don't fail on individual bad records
                    tracing::warn!(index, id = %session.id, "skipping inconsistent session");
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping unparseable session");
                }
            }
        }

        sessions
    }

    /// Overwrite the file with the full in-memory collection
    pub fn save(&self) -> Result<()> {
        let snapshot = Snapshot {
            version: SCHEMA_VERSION,
            sessions: &self.sessions,
        };
        let content =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize sessions")?;

        // Write beside the target and rename, so a crash never leaves half a file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write sessions: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace sessions: {}", self.path.display()))
    }

    /// Prepend a new session and persist
    pub fn add(&mut self, session: Session) -> Result<()> {
        tracing::info!(id = %session.id, duration = session.duration, "session added");
        self.sessions.insert(0, session);
        self.save()
    }

    /// Remove the session with `id` and persist. Returns whether anything was removed;
    /// an unknown id leaves the collection (and the file) untouched.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);

        if self.sessions.len() == before {
            tracing::debug!(id, "remove: no such session");
            return Ok(false);
        }

        tracing::info!(id, "session removed");
        self.save()?;
        Ok(true)
    }

    /// All sessions, newest entries first
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Sessions whose id starts with `prefix`. A blank prefix matches nothing.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<&Session> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Vec::new();
        }

        self.sessions
            .iter()
            .filter(|s| s.id.starts_with(prefix))
            .collect()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};
    use tempfile::TempDir;

    fn temp_store() -> (SessionStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::open(&dir.path().join("sessions.json")).unwrap();
        (store, dir)
    }

    fn make_session(minutes: i64, note: &str) -> Session {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        Session::new(start, start + Duration::minutes(minutes), note).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (store, _dir) = temp_store();
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_add_prepends_and_persists() {
        let (mut store, _dir) = temp_store();

        store.add(make_session(5, "first")).unwrap();
        assert_eq!(SessionStore::load(store.path()), store.sessions());

        store.add(make_session(10, "second")).unwrap();
        assert_eq!(store.sessions()[0].note, "second");
        assert_eq!(store.sessions()[1].note, "first");
        assert_eq!(SessionStore::load(store.path()), store.sessions());
    }

    #[test]
    fn test_persisted_matches_memory_after_each_operation() {
        let (mut store, _dir) = temp_store();
        let a = make_session(5, "a");
        let b = make_session(6, "b");
        let c = make_session(7, "c");
        let b_id = b.id.clone();
        let a_id = a.id.clone();

        store.add(a).unwrap();
        assert_eq!(SessionStore::load(store.path()), store.sessions());
        store.add(b).unwrap();
        assert_eq!(SessionStore::load(store.path()), store.sessions());
        assert!(store.remove(&b_id).unwrap());
        assert_eq!(SessionStore::load(store.path()), store.sessions());
        store.add(c).unwrap();
        assert_eq!(SessionStore::load(store.path()), store.sessions());
        assert!(store.remove(&a_id).unwrap());
        assert_eq!(SessionStore::load(store.path()), store.sessions());
        assert_eq!(store.sessions().len(), 1);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let (mut store, _dir) = temp_store();
        store.add(make_session(5, "keep")).unwrap();
        let before = store.sessions().to_vec();

        assert!(!store.remove("does-not-exist").unwrap());
        assert_eq!(store.sessions(), before.as_slice());
        assert_eq!(SessionStore::load(store.path()), before);
    }

    #[test]
    fn test_reopen_restores_sessions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        {
            let mut store = SessionStore::open(&path).unwrap();
            store.add(make_session(15, "gossip")).unwrap();
        }
        let store = SessionStore::open(&path).unwrap();
        assert_eq!(store.sessions().len(), 1);
        assert_eq!(store.sessions()[0].note, "gossip");
    }

    #[test]
    fn test_file_is_versioned() {
        let (mut store, _dir) = temp_store();
        store.add(make_session(5, "x")).unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], SCHEMA_VERSION);
        assert_eq!(raw["sessions"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::open(&path).unwrap();
        assert!(store.sessions().is_empty());
    }

    #[test]
    fn test_legacy_array_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(
            &path,
            r#"[{"id":"abc","startTime":1704099600000,"endTime":1704100500000,
                "duration":900,"note":"Weekend plans","date":"2024-01-01"}]"#,
        )
        .unwrap();

        let sessions = SessionStore::load(&path);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "abc");
        assert_eq!(sessions[0].duration, 900);
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(
            &path,
            r#"{"version":1,"sessions":[
                {"id":"good","startTime":1704099600000,"endTime":1704100500000,
                 "duration":900,"note":"ok","date":"2024-01-01"},
                {"id":"reversed","startTime":1704100500000,"endTime":1704099600000,
                 "duration":0,"note":"bad","date":"2024-01-01"},
                {"id":"garbage"}
            ]}"#,
        )
        .unwrap();

        let sessions = SessionStore::load(&path);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "good");
    }

    #[test]
    fn test_overflowing_timestamps_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sessions.json");
        fs::write(
            &path,
            r#"[
                {"id":"huge","startTime":-9000000000000000000,"endTime":9000000000000000000,
                 "duration":0,"note":"bad","date":"2024-01-01"},
                {"id":"good","startTime":1704099600000,"endTime":1704100500000,
                 "duration":900,"note":"ok","date":"2024-01-01"}
            ]"#,
        )
        .unwrap();

        let sessions = SessionStore::load(&path);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "good");
    }

    #[test]
    fn test_find_by_prefix() {
        let (mut store, _dir) = temp_store();
        let session = make_session(5, "x");
        let id = session.id.clone();
        store.add(session).unwrap();

        assert_eq!(store.find_by_prefix(&id[..8]).len(), 1);
        assert!(store.find_by_prefix("zzzz-not-a-uuid").is_empty());
        assert!(store.find_by_prefix("").is_empty());
        assert!(store.find_by_prefix("   ").is_empty());
    }
}
