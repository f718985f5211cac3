//! Single-slot undo and restore buffers
//!
//! Both slots are time-boxed by the same window. A slot is usable while
//! `now - recorded_at <= window`; overwriting a slot restarts its window.

use chrono::{DateTime, Local};
use smash_api::{Entity, MonthlyStats};
use std::collections::BTreeMap;
use std::time::Duration;

/// State captured before an undoable action
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSnapshot {
    /// The affected entity as it was
    pub entity: Entity,
    /// Its position in its collection
    pub index: usize,
    pub coins: u64,
    pub infestation: u32,
    pub monthly_stats: BTreeMap<String, MonthlyStats>,
    pub taken_at: DateTime<Local>,
}

/// Entity removed by a delete, kept for one restore
#[derive(Debug, Clone, PartialEq)]
pub struct RecentlyDeleted {
    pub entity: Entity,
    pub deleted_at: DateTime<Local>,
}

/// Which slots lapsed during an expiry sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expired {
    pub action: bool,
    pub deleted: bool,
}

#[derive(Debug)]
pub struct UndoLog {
    window: Duration,
    last_action: Option<UndoSnapshot>,
    recently_deleted: Option<RecentlyDeleted>,
}

impl UndoLog {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_action: None,
            recently_deleted: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn is_expired(&self, recorded_at: DateTime<Local>, now: DateTime<Local>) -> bool {
        let elapsed = now.signed_duration_since(recorded_at);
        match elapsed.to_std() {
            Ok(elapsed) => elapsed > self.window,
            // Recorded in the future (clock moved back): still usable
            Err(_) => false,
        }
    }

    fn remaining(&self, recorded_at: DateTime<Local>, now: DateTime<Local>) -> Option<Duration> {
        if self.is_expired(recorded_at, now) {
            return None;
        }
        let elapsed = now
            .signed_duration_since(recorded_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        Some(self.window.saturating_sub(elapsed))
    }

    pub fn record_action(&mut self, snapshot: UndoSnapshot) {
        self.last_action = Some(snapshot);
    }

    pub fn clear_action(&mut self) {
        self.last_action = None;
    }

    /// Take the undo snapshot if it has not lapsed. An expired snapshot is
    /// discarded.
    pub fn take_action(&mut self, now: DateTime<Local>) -> Option<UndoSnapshot> {
        let snapshot = self.last_action.take()?;
        if self.is_expired(snapshot.taken_at, now) {
            return None;
        }
        Some(snapshot)
    }

    pub fn action_remaining(&self, now: DateTime<Local>) -> Option<Duration> {
        let snapshot = self.last_action.as_ref()?;
        self.remaining(snapshot.taken_at, now)
    }

    pub fn pending_action(&self) -> Option<&UndoSnapshot> {
        self.last_action.as_ref()
    }

    pub fn record_delete(&mut self, entity: Entity, now: DateTime<Local>) {
        self.recently_deleted = Some(RecentlyDeleted {
            entity,
            deleted_at: now,
        });
    }

    /// Take the deleted entity if its window has not lapsed
    pub fn take_deleted(&mut self, now: DateTime<Local>) -> Option<Entity> {
        let deleted = self.recently_deleted.take()?;
        if self.is_expired(deleted.deleted_at, now) {
            return None;
        }
        Some(deleted.entity)
    }

    pub fn deleted_remaining(&self, now: DateTime<Local>) -> Option<Duration> {
        let deleted = self.recently_deleted.as_ref()?;
        self.remaining(deleted.deleted_at, now)
    }

    pub fn pending_deleted(&self) -> Option<&RecentlyDeleted> {
        self.recently_deleted.as_ref()
    }

    /// Drop every slot whose window has lapsed
    pub fn expire(&mut self, now: DateTime<Local>) -> Expired {
        let mut expired = Expired::default();

        if let Some(snapshot) = &self.last_action {
            if self.is_expired(snapshot.taken_at, now) {
                self.last_action = None;
                expired.action = true;
            }
        }

        if let Some(deleted) = &self.recently_deleted {
            if self.is_expired(deleted.deleted_at, now) {
                self.recently_deleted = None;
                expired.deleted = true;
            }
        }

        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use smash_api::{Difficulty, Task, TaskStatus};
    use smash_util::TaskId;

    fn at(secs: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
            + chrono::Duration::seconds(secs as i64)
    }

    fn task_entity() -> Entity {
        Entity::Task(Task {
            id: TaskId::new(),
            title: "Write report".into(),
            difficulty: Difficulty::Medium,
            status: TaskStatus::Locked,
            created_at: at(0),
            note: None,
            checklist: None,
        })
    }

    fn snapshot(taken_at: DateTime<Local>) -> UndoSnapshot {
        UndoSnapshot {
            entity: task_entity(),
            index: 0,
            coins: 0,
            infestation: 0,
            monthly_stats: BTreeMap::new(),
            taken_at,
        }
    }

    #[test]
    fn test_action_within_window() {
        let mut log = UndoLog::new(Duration::from_secs(10));
        log.record_action(snapshot(at(0)));

        assert_eq!(log.action_remaining(at(4)), Some(Duration::from_secs(6)));
        // The boundary itself is still inside the window
        assert!(log.take_action(at(10)).is_some());
        // Taking clears the slot
        assert!(log.take_action(at(10)).is_none());
    }

    #[test]
    fn test_action_after_window() {
        let mut log = UndoLog::new(Duration::from_secs(10));
        log.record_action(snapshot(at(0)));

        assert_eq!(log.action_remaining(at(11)), None);
        assert!(log.take_action(at(11)).is_none());
        assert!(log.pending_action().is_none());
    }

    #[test]
    fn test_overwrite_restarts_window() {
        let mut log = UndoLog::new(Duration::from_secs(10));
        log.record_action(snapshot(at(0)));
        log.record_action(snapshot(at(8)));

        assert!(log.take_action(at(15)).is_some());
    }

    #[test]
    fn test_expire_sweep() {
        let mut log = UndoLog::new(Duration::from_secs(10));
        log.record_action(snapshot(at(0)));
        log.record_delete(task_entity(), at(5));

        assert_eq!(log.expire(at(9)), Expired::default());

        let expired = log.expire(at(12));
        assert!(expired.action);
        assert!(!expired.deleted);
        assert!(log.pending_deleted().is_some());

        let expired = log.expire(at(16));
        assert!(expired.deleted);
        assert!(log.pending_deleted().is_none());
    }

    #[test]
    fn test_take_deleted() {
        let mut log = UndoLog::new(Duration::from_secs(10));
        let entity = task_entity();
        log.record_delete(entity.clone(), at(0));

        assert_eq!(log.deleted_remaining(at(3)), Some(Duration::from_secs(7)));
        assert_eq!(log.take_deleted(at(3)), Some(entity));
        assert_eq!(log.take_deleted(at(3)), None);
    }
}
