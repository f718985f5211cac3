//! Shared fixtures for engine unit tests

use chrono::NaiveDate;
use smash_api::{Difficulty, Document, EntityKind};
use smash_config::Rules;
use smash_store::{AuditEvent, SqliteStore, Store, StoreError, StoreResult};
use smash_util::ManualClock;
use std::sync::{Arc, Mutex};

use crate::{Engine, Feedback};

/// A date in June 2025
pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, n).unwrap()
}

/// Engine over an in-memory store with a clock parked at noon on `date`
pub fn engine_at(date: NaiveDate) -> (Engine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at_date(date));
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    let engine = Engine::from_document(Document::default(), Rules::default(), store, clock.clone());
    (engine, clock)
}

/// Store whose every call fails
pub struct FailingStore;

impl Store for FailingStore {
    fn load_document(&self) -> StoreResult<Option<Document>> {
        Err(StoreError::Database("disk unplugged".into()))
    }

    fn save_document(&self, _document: &Document) -> StoreResult<()> {
        Err(StoreError::Database("disk unplugged".into()))
    }

    fn append_audit(&self, _event: AuditEvent) -> StoreResult<()> {
        Err(StoreError::Database("disk unplugged".into()))
    }

    fn get_recent_audits(&self, _limit: usize) -> StoreResult<Vec<AuditEvent>> {
        Err(StoreError::Database("disk unplugged".into()))
    }

    fn is_healthy(&self) -> bool {
        false
    }
}

/// Feedback that remembers every call
#[derive(Default)]
pub struct RecordingFeedback {
    pub calls: Mutex<Vec<(EntityKind, Difficulty)>>,
}

impl Feedback for RecordingFeedback {
    fn smashed(&self, kind: EntityKind, difficulty: Difficulty) {
        self.calls.lock().unwrap().push((kind, difficulty));
    }
}
