//! SQLite-based store implementation

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use smash_api::Document;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{migrate_document, AuditEvent, Store, StoreError, StoreResult};

/// Key under which the document blob is stored
const DOCUMENT_KEY: &str = "document";

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Key-value blobs (the document lives under a single key)
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Audit log (append-only)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                event_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_timestamp ON audit_log(timestamp);
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn load_document(&self) -> StoreResult<Option<Document>> {
        let conn = self.conn()?;

        let json: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?", [DOCUMENT_KEY], |row| {
                row.get(0)
            })
            .optional()?;

        match json {
            Some(s) => {
                let raw: serde_json::Value = serde_json::from_str(&s)?;
                let migrated = migrate_document(raw)?;
                debug!(
                    from_version = migrated.from_version,
                    tasks = migrated.document.tasks.len(),
                    habits = migrated.document.habits.len(),
                    "Document loaded"
                );
                Ok(Some(migrated.document))
            }
            None => Ok(None),
        }
    }

    fn save_document(&self, document: &Document) -> StoreResult<()> {
        let json = serde_json::to_string(document)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO kv (key, value)
            VALUES (?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value = excluded.value
            "#,
            params![DOCUMENT_KEY, json],
        )?;

        debug!(bytes = json.len(), "Document saved");
        Ok(())
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let conn = self.conn()?;
        let event_json = serde_json::to_string(&event.event)?;

        conn.execute(
            "INSERT INTO audit_log (timestamp, event_json) VALUES (?, ?)",
            params![event.timestamp.to_rfc3339(), event_json],
        )?;

        event.id = conn.last_insert_rowid();
        debug!(event_id = event.id, "Audit event appended");

        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, timestamp, event_json FROM audit_log ORDER BY id DESC LIMIT ?",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let timestamp_str: String = row.get(1)?;
            let event_json: String = row.get(2)?;
            Ok((id, timestamp_str, event_json))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, timestamp_str, event_json) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                .map(|dt| dt.with_timezone(&Local))
                .unwrap_or_else(|_| smash_util::now());
            let event: crate::AuditEventType = serde_json::from_str(&event_json)?;

            events.push(AuditEvent {
                id,
                timestamp,
                event,
            });
        }

        Ok(events)
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditEventType;
    use smash_api::{Difficulty, Task, TaskStatus};
    use smash_util::TaskId;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_document_round_trip() {
        let store = SqliteStore::in_memory().unwrap();

        // Nothing persisted yet
        assert!(store.load_document().unwrap().is_none());

        let mut doc = Document {
            coins: 12,
            infestation: 3,
            ..Default::default()
        };
        doc.tasks.push(Task {
            id: TaskId::new(),
            title: "Write report".into(),
            difficulty: Difficulty::Hard,
            status: TaskStatus::Unlocked,
            created_at: smash_util::now(),
            note: Some("due friday".into()),
            checklist: None,
        });
        store.save_document(&doc).unwrap();

        // Second save replaces the first
        doc.coins = 13;
        store.save_document(&doc).unwrap();

        let loaded = store.load_document().unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_legacy_blob_is_migrated_on_load() {
        let store = SqliteStore::in_memory().unwrap();
        {
            let conn = store.conn().unwrap();
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?, ?)",
                params![
                    DOCUMENT_KEY,
                    r#"{"tasks":[],"habits":[],"coins":4,"infestation":1,"monthlyProgress":{"2024-06":3}}"#
                ],
            )
            .unwrap();
        }

        let doc = store.load_document().unwrap().unwrap();
        assert_eq!(doc.coins, 4);
        assert_eq!(doc.monthly_stats["2024-06"].smashed_count, 3);
    }

    #[test]
    fn test_audit_log() {
        let store = SqliteStore::in_memory().unwrap();

        let event = AuditEvent::new(
            AuditEventType::DocumentLoaded { tasks: 0, habits: 0 },
            smash_util::now(),
        );
        store.append_audit(event).unwrap();
        store
            .append_audit(AuditEvent::new(
                AuditEventType::TasksAdded {
                    title: "Floss".into(),
                    count: 1,
                },
                smash_util::now(),
            ))
            .unwrap();

        let events = store.get_recent_audits(10).unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0].event, AuditEventType::TasksAdded { .. }));
        assert!(matches!(events[1].event, AuditEventType::DocumentLoaded { .. }));
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smash.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            let doc = Document {
                coins: 99,
                ..Default::default()
            };
            store.save_document(&doc).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_document().unwrap().unwrap().coins, 99);
    }
}
