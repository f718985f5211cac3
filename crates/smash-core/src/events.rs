//! Core events emitted by the engine

use chrono::NaiveDate;
use smash_api::{EntityKind, InfestationLevel, PoisonSize};
use smash_util::{ChecklistItemId, HabitId, TaskId};

/// Events emitted by the core engine. An operation that returns no events
/// changed nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreEvent {
    /// Tasks created, in collection order
    TasksAdded { task_ids: Vec<TaskId> },

    /// Task fields edited
    TaskUpdated { task_id: TaskId },

    /// Task moved from locked to unlocked
    TaskUnlocked { task_id: TaskId },

    /// Task smashed and rewarded
    TaskSmashed { task_id: TaskId, coins_awarded: u64 },

    /// Task failed; it left the live collection
    TaskFailed {
        task_id: TaskId,
        infestation_added: u32,
    },

    /// Smashed tasks swept out of the collection
    SmashedTasksCleared { count: usize },

    /// Habit created
    HabitAdded { habit_id: HabitId },

    /// Habit fields edited
    HabitUpdated { habit_id: HabitId },

    /// Due habits became active for the day
    HabitsSpawned {
        habit_ids: Vec<HabitId>,
        /// Habits whose previous occurrence lapsed unfinished
        missed: Vec<HabitId>,
    },

    /// One required completion logged
    HabitOccurrenceCompleted {
        habit_id: HabitId,
        remaining_today: u32,
        unlocked: bool,
    },

    /// Habit occurrence smashed and rewarded
    HabitSmashed {
        habit_id: HabitId,
        coins_awarded: u64,
        next_due_date: NaiveDate,
    },

    /// Habit occurrence failed
    HabitFailed {
        habit_id: HabitId,
        infestation_added: u32,
        next_due_date: NaiveDate,
    },

    /// Checklist item flipped
    ChecklistItemToggled {
        kind: EntityKind,
        item_id: ChecklistItemId,
        done: bool,
    },

    /// Entity moved to the recently-deleted slot
    Deleted { kind: EntityKind, title: String },

    /// Entity brought back from the recently-deleted slot
    Restored { kind: EntityKind, title: String },

    /// Last undoable action reverted
    Undone { kind: EntityKind, title: String },

    /// Undo slot lapsed
    UndoExpired,

    /// Recently-deleted slot lapsed
    RestoreExpired,

    /// Poison bought from the shop
    PoisonBought {
        size: PoisonSize,
        cost: u64,
        infestation_cleared: u32,
    },

    /// Infestation crossed a level boundary
    InfestationLevelChanged {
        from: InfestationLevel,
        to: InfestationLevel,
    },

    /// Sound preference changed
    SoundToggled { on: bool },
}
