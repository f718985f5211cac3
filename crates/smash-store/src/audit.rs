//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use smash_api::{Difficulty, EntityKind, PoisonSize};
use smash_util::{HabitId, TaskId};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Document rehydrated at startup
    DocumentLoaded { tasks: usize, habits: usize },

    /// One or more tasks created
    TasksAdded { title: String, count: usize },

    /// Habit created
    HabitAdded { habit_id: HabitId, title: String },

    /// Task unlocked
    TaskUnlocked { task_id: TaskId },

    /// Task smashed and rewarded
    TaskSmashed {
        task_id: TaskId,
        difficulty: Difficulty,
        coins_awarded: u64,
    },

    /// Task failed and penalised
    TaskFailed {
        task_id: TaskId,
        difficulty: Difficulty,
        infestation_added: u32,
    },

    /// Due habits spawned for a day
    HabitsSpawned { count: usize, missed: usize },

    /// Habit occurrence smashed and rewarded
    HabitSmashed {
        habit_id: HabitId,
        difficulty: Difficulty,
        coins_awarded: u64,
    },

    /// Habit occurrence failed or left unfinished
    HabitFailed {
        habit_id: HabitId,
        difficulty: Difficulty,
        infestation_added: u32,
    },

    /// Poison bought in the shop
    PoisonBought {
        size: PoisonSize,
        cost: u64,
        infestation_cleared: u32,
    },

    /// Last action reverted
    ActionUndone { kind: EntityKind, title: String },

    /// Entity moved to the recently-deleted slot
    EntityDeleted { kind: EntityKind, title: String },

    /// Entity restored from the recently-deleted slot
    EntityRestored { kind: EntityKind, title: String },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType, timestamp: DateTime<Local>) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp,
            event,
        }
    }
}
