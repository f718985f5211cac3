//! Core engine

use chrono::{DateTime, Local};
use smash_api::{
    Difficulty, Document, Entity, EntityKind, InfestationLevel, MonthlyStats, StatItem,
};
use smash_config::Rules;
use smash_store::{AuditEvent, AuditEventType, Store, StoreResult};
use smash_util::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{CoreEvent, Feedback, NoFeedback, RecentlyDeleted, UndoLog, UndoSnapshot};

/// The task & reward engine. Owns the document for one session.
pub struct Engine {
    pub(crate) document: Document,
    pub(crate) rules: Rules,
    pub(crate) store: Arc<dyn Store>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) feedback: Arc<dyn Feedback>,
    pub(crate) undo: UndoLog,
    pub(crate) level: InfestationLevel,
}

impl Engine {
    /// Rehydrate the engine from the store. An empty store starts a fresh
    /// document.
    pub fn load(rules: Rules, store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let document = store.load_document()?.unwrap_or_default();
        Ok(Self::from_document(document, rules, store, clock))
    }

    /// Create an engine around an existing document
    pub fn from_document(
        mut document: Document,
        rules: Rules,
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        document.normalize();
        document.trim_history(rules.history_limit);
        let level = document.infestation_level(rules.warning_threshold);

        info!(
            tasks = document.tasks.len(),
            habits = document.habits.len(),
            coins = document.coins,
            infestation = document.infestation,
            level = ?level,
            "Core engine initialized"
        );

        let _ = store.append_audit(AuditEvent::new(
            AuditEventType::DocumentLoaded {
                tasks: document.tasks.len(),
                habits: document.habits.len(),
            },
            clock.now(),
        ));

        Self {
            undo: UndoLog::new(rules.undo_window),
            document,
            rules,
            store,
            clock,
            feedback: Arc::new(NoFeedback),
            level,
        }
    }

    /// Attach a sound/haptic collaborator
    pub fn with_feedback(mut self, feedback: Arc<dyn Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    /// Current document
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn infestation_level(&self) -> InfestationLevel {
        self.level
    }

    pub fn is_overrun(&self) -> bool {
        self.document.is_overrun()
    }

    /// `YYYY-MM` key of the clock's current month
    pub fn current_month(&self) -> String {
        smash_util::month_key(self.clock.today())
    }

    /// Stats for a month; empty when nothing was recorded
    pub fn month_summary(&self, month: &str) -> MonthlyStats {
        self.document
            .monthly_stats
            .get(month)
            .cloned()
            .unwrap_or_default()
    }

    /// Time left to undo the last action, if any
    pub fn undo_remaining(&self) -> Option<Duration> {
        self.undo.action_remaining(self.clock.now())
    }

    /// Time left to restore the last deleted entity, if any
    pub fn restore_remaining(&self) -> Option<Duration> {
        self.undo.deleted_remaining(self.clock.now())
    }

    pub fn pending_undo(&self) -> Option<&UndoSnapshot> {
        self.undo.pending_action()
    }

    pub fn recently_deleted(&self) -> Option<&RecentlyDeleted> {
        self.undo.pending_deleted()
    }

    /// Recent audit events, newest first
    pub fn recent_audits(&self, limit: usize) -> Vec<AuditEvent> {
        match self.store.get_recent_audits(limit) {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Failed to read audit log");
                Vec::new()
            }
        }
    }

    /// Revert the last undoable action if its window is still open
    pub fn undo_last_action(&mut self) -> Vec<CoreEvent> {
        let Some(snapshot) = self.undo.take_action(self.clock.now()) else {
            debug!("Nothing to undo");
            return Vec::new();
        };

        let mut next = self.document.clone();
        next.coins = snapshot.coins;
        next.infestation = snapshot.infestation;
        next.monthly_stats = snapshot.monthly_stats;

        let kind = snapshot.entity.kind();
        let title = snapshot.entity.title().to_string();
        match snapshot.entity {
            Entity::Task(task) => match next.task_index(&task.id) {
                Some(i) => next.tasks[i] = task,
                None => {
                    let at = snapshot.index.min(next.tasks.len());
                    next.tasks.insert(at, task);
                }
            },
            Entity::Habit(habit) => match next.habit_index(&habit.id) {
                Some(i) => next.habits[i] = habit,
                None => {
                    let at = snapshot.index.min(next.habits.len());
                    next.habits.insert(at, habit);
                }
            },
        }

        info!(kind = %kind, title = %title, "Action undone");
        self.audit(AuditEventType::ActionUndone {
            kind,
            title: title.clone(),
        });

        let mut events = vec![CoreEvent::Undone { kind, title }];
        events.extend(self.commit(next));
        events
    }

    /// Put the last deleted entity back at the head of its collection
    pub fn undo_delete(&mut self) -> Vec<CoreEvent> {
        let Some(entity) = self.undo.take_deleted(self.clock.now()) else {
            debug!("Nothing to restore");
            return Vec::new();
        };

        self.undo.clear_action();

        let mut next = self.document.clone();
        let kind = entity.kind();
        let title = entity.title().to_string();
        match entity {
            Entity::Task(task) => next.tasks.insert(0, task),
            Entity::Habit(habit) => next.habits.insert(0, habit),
        }

        info!(kind = %kind, title = %title, "Entity restored");
        self.audit(AuditEventType::EntityRestored {
            kind,
            title: title.clone(),
        });

        let mut events = vec![CoreEvent::Restored { kind, title }];
        events.extend(self.commit(next));
        events
    }

    /// Drop undo and restore slots whose windows have lapsed
    pub fn tick(&mut self) -> Vec<CoreEvent> {
        let expired = self.undo.expire(self.clock.now());
        let mut events = Vec::new();

        if expired.action {
            debug!("Undo window elapsed");
            events.push(CoreEvent::UndoExpired);
        }
        if expired.deleted {
            debug!("Restore window elapsed");
            events.push(CoreEvent::RestoreExpired);
        }

        events
    }

    /// Turn smash feedback on or off
    pub fn set_sound(&mut self, on: bool) -> Vec<CoreEvent> {
        if self.document.settings.sound_on == on {
            return Vec::new();
        }

        let mut next = self.document.clone();
        next.settings.sound_on = on;
        info!(on, "Sound setting changed");

        let mut events = vec![CoreEvent::SoundToggled { on }];
        events.extend(self.commit(next));
        events
    }

    /// Replace the document with `next`, recompute the infestation level
    /// and persist. A failed write leaves the in-memory document in place.
    pub(crate) fn commit(&mut self, next: Document) -> Vec<CoreEvent> {
        self.document = next;

        let mut events = Vec::new();
        let level = self.document.infestation_level(self.rules.warning_threshold);
        if level != self.level {
            info!(
                from = ?self.level,
                to = ?level,
                infestation = self.document.infestation,
                "Infestation level changed"
            );
            events.push(CoreEvent::InfestationLevelChanged {
                from: self.level,
                to: level,
            });
            self.level = level;
        }

        if let Err(e) = self.store.save_document(&self.document) {
            warn!(error = %e, "Failed to persist document; keeping in-memory state");
        }

        events
    }

    pub(crate) fn audit(&self, event: AuditEventType) {
        let _ = self
            .store
            .append_audit(AuditEvent::new(event, self.clock.now()));
    }

    pub(crate) fn snapshot(&self, entity: Entity, index: usize) -> UndoSnapshot {
        UndoSnapshot {
            entity,
            index,
            coins: self.document.coins,
            infestation: self.document.infestation,
            monthly_stats: self.document.monthly_stats.clone(),
            taken_at: self.clock.now(),
        }
    }

    pub(crate) fn stat_item(&self, title: &str, difficulty: Difficulty, kind: EntityKind) -> StatItem {
        StatItem {
            title: title.to_string(),
            difficulty,
            kind,
            at: self.clock.now(),
        }
    }

    /// Fire smash feedback if sound is on
    pub(crate) fn notify_smash(&self, kind: EntityKind, difficulty: Difficulty) {
        if self.document.settings.sound_on {
            self.feedback.smashed(kind, difficulty);
        }
    }
}
