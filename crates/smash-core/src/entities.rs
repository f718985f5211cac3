//! Entity store: creating, editing and removing tasks and habits, and the
//! one-off task lifecycle

use chrono::NaiveDate;
use smash_api::{
    ChecklistItem, Difficulty, Entity, EntityKind, Habit, IntervalType, Task, TaskStatus,
    MAX_TASK_BATCH, MAX_TIMES_PER_DAY,
};
use smash_store::AuditEventType;
use smash_util::{ChecklistItemId, HabitId, TaskId};
use tracing::{debug, info};

use crate::{credit_smash, penalize_fail, CoreEvent, Engine};

/// Optional parts of a new task
#[derive(Debug, Clone, Default)]
pub struct TaskOptions {
    /// How many copies to create; clamped to `1..=10`
    pub count: u32,
    pub note: Option<String>,
    /// Template checklist; each task gets its own copy with fresh ids
    pub checklist: Option<Vec<ChecklistItem>>,
}

/// Field edits for a task. `None` leaves a field alone; `Some(None)`
/// clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub note: Option<Option<String>>,
    pub checklist: Option<Option<Vec<ChecklistItem>>>,
}

/// Optional parts of a new habit
#[derive(Debug, Clone, Default)]
pub struct HabitOptions {
    /// Completions required per occurrence; clamped to `1..=10`
    pub times_per_day: u32,
    pub note: Option<String>,
    pub checklist: Option<Vec<ChecklistItem>>,
    /// First due date; today when absent
    pub start_date: Option<NaiveDate>,
}

/// Field edits for a habit
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub interval_type: Option<IntervalType>,
    pub times_per_day: Option<u32>,
    pub next_due_date: Option<NaiveDate>,
    pub note: Option<Option<String>>,
    pub checklist: Option<Option<Vec<ChecklistItem>>>,
}

/// Reference to a live task or habit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Task(TaskId),
    Habit(HabitId),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Task(_) => EntityKind::Task,
            EntityRef::Habit(_) => EntityKind::Habit,
        }
    }
}

fn clean_title(title: &str) -> Option<String> {
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

fn clean_note(note: Option<String>) -> Option<String> {
    note.and_then(|n| clean_title(&n))
}

fn copy_checklist(checklist: Option<&Vec<ChecklistItem>>) -> Option<Vec<ChecklistItem>> {
    checklist.map(|items| items.iter().map(ChecklistItem::duplicate).collect())
}

fn clamp_times_per_day(times: u32) -> u32 {
    times.clamp(1, MAX_TIMES_PER_DAY)
}

impl Engine {
    /// Create one or more locked tasks at the head of the collection
    pub fn add_task(
        &mut self,
        title: &str,
        difficulty: Difficulty,
        options: TaskOptions,
    ) -> Vec<CoreEvent> {
        let Some(title) = clean_title(title) else {
            debug!("Ignoring task with empty title");
            return Vec::new();
        };

        let count = options.count.clamp(1, MAX_TASK_BATCH);
        let note = clean_note(options.note);
        let now = self.clock.now();

        let new_tasks: Vec<Task> = (1..=count)
            .map(|i| Task {
                id: TaskId::new(),
                title: if count > 1 {
                    format!("{} ({}/{})", title, i, count)
                } else {
                    title.clone()
                },
                difficulty,
                status: TaskStatus::Locked,
                created_at: now,
                note: note.clone(),
                checklist: copy_checklist(options.checklist.as_ref()),
            })
            .collect();
        let task_ids: Vec<TaskId> = new_tasks.iter().map(|t| t.id).collect();

        let mut next = self.document.clone();
        next.tasks.splice(0..0, new_tasks);
        self.undo.clear_action();

        info!(title = %title, count, difficulty = %difficulty, "Tasks added");
        self.audit(AuditEventType::TasksAdded {
            title,
            count: count as usize,
        });

        let mut events = vec![CoreEvent::TasksAdded { task_ids }];
        events.extend(self.commit(next));
        events
    }

    /// Edit a task's fields. Status is not editable.
    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> Vec<CoreEvent> {
        let Some(index) = self.document.task_index(id) else {
            debug!(task_id = %id, "Update of unknown task ignored");
            return Vec::new();
        };

        let mut next = self.document.clone();
        let task = &mut next.tasks[index];
        if let Some(title) = patch.title.as_deref().and_then(clean_title) {
            task.title = title;
        }
        if let Some(difficulty) = patch.difficulty {
            task.difficulty = difficulty;
        }
        if let Some(note) = patch.note {
            task.note = clean_note(note);
        }
        if let Some(checklist) = patch.checklist {
            task.checklist = checklist;
        }

        if next.tasks[index] == self.document.tasks[index] {
            return Vec::new();
        }

        self.undo.clear_action();
        info!(task_id = %id, "Task updated");

        let mut events = vec![CoreEvent::TaskUpdated { task_id: *id }];
        events.extend(self.commit(next));
        events
    }

    /// Move a task into the recently-deleted slot
    pub fn delete_task(&mut self, id: &TaskId) -> Vec<CoreEvent> {
        let Some(index) = self.document.task_index(id) else {
            debug!(task_id = %id, "Delete of unknown task ignored");
            return Vec::new();
        };

        let mut next = self.document.clone();
        let task = next.tasks.remove(index);
        let title = task.title.clone();

        self.undo.clear_action();
        self.undo.record_delete(Entity::Task(task), self.clock.now());

        info!(task_id = %id, title = %title, "Task deleted");
        self.audit(AuditEventType::EntityDeleted {
            kind: EntityKind::Task,
            title: title.clone(),
        });

        let mut events = vec![CoreEvent::Deleted {
            kind: EntityKind::Task,
            title,
        }];
        events.extend(self.commit(next));
        events
    }

    /// Locked -> Unlocked. Undoable.
    pub fn unlock_task(&mut self, id: &TaskId) -> Vec<CoreEvent> {
        let Some(index) = self.document.task_index(id) else {
            return Vec::new();
        };
        let task = &self.document.tasks[index];
        if task.status != TaskStatus::Locked {
            debug!(task_id = %id, status = ?task.status, "Unlock ignored");
            return Vec::new();
        }

        let snapshot = self.snapshot(Entity::Task(task.clone()), index);
        let mut next = self.document.clone();
        next.tasks[index].status = TaskStatus::Unlocked;
        self.undo.record_action(snapshot);

        info!(task_id = %id, "Task unlocked");
        self.audit(AuditEventType::TaskUnlocked { task_id: *id });

        let mut events = vec![CoreEvent::TaskUnlocked { task_id: *id }];
        events.extend(self.commit(next));
        events
    }

    /// Unlocked -> Smashed, crediting the reward. Undoable.
    pub fn smash_task(&mut self, id: &TaskId) -> Vec<CoreEvent> {
        let Some(index) = self.document.task_index(id) else {
            return Vec::new();
        };
        let task = &self.document.tasks[index];
        if task.status != TaskStatus::Unlocked {
            debug!(task_id = %id, status = ?task.status, "Smash ignored");
            return Vec::new();
        }

        let difficulty = task.difficulty;
        let item = self.stat_item(&task.title, difficulty, EntityKind::Task);
        let snapshot = self.snapshot(Entity::Task(task.clone()), index);
        let month = self.current_month();

        let mut next = self.document.clone();
        next.tasks[index].status = TaskStatus::Smashed;
        let coins_awarded = credit_smash(&mut next, item, &self.rules, &month);
        self.undo.record_action(snapshot);

        info!(task_id = %id, difficulty = %difficulty, coins_awarded, "Task smashed");
        self.audit(AuditEventType::TaskSmashed {
            task_id: *id,
            difficulty,
            coins_awarded,
        });

        let mut events = vec![CoreEvent::TaskSmashed {
            task_id: *id,
            coins_awarded,
        }];
        events.extend(self.commit(next));
        self.notify_smash(EntityKind::Task, difficulty);
        events
    }

    /// The bug escaped: penalise and drop the task. Undoable.
    pub fn fail_task(&mut self, id: &TaskId) -> Vec<CoreEvent> {
        let Some(index) = self.document.task_index(id) else {
            return Vec::new();
        };
        let task = &self.document.tasks[index];
        if task.status == TaskStatus::Smashed {
            debug!(task_id = %id, "Fail of smashed task ignored");
            return Vec::new();
        }

        let difficulty = task.difficulty;
        let item = self.stat_item(&task.title, difficulty, EntityKind::Task);
        let snapshot = self.snapshot(Entity::Task(task.clone()), index);
        let month = self.current_month();

        let mut next = self.document.clone();
        next.tasks.remove(index);
        let infestation_added = penalize_fail(&mut next, item, &self.rules, &month);
        self.undo.record_action(snapshot);

        info!(
            task_id = %id,
            difficulty = %difficulty,
            infestation_added,
            infestation = next.infestation,
            "Task failed"
        );
        self.audit(AuditEventType::TaskFailed {
            task_id: *id,
            difficulty,
            infestation_added,
        });

        let mut events = vec![CoreEvent::TaskFailed {
            task_id: *id,
            infestation_added,
        }];
        events.extend(self.commit(next));
        events
    }

    /// Remove every smashed task. Not recoverable.
    pub fn clear_smashed_tasks(&mut self) -> Vec<CoreEvent> {
        let count = self
            .document
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Smashed)
            .count();
        if count == 0 {
            return Vec::new();
        }

        let mut next = self.document.clone();
        next.tasks.retain(|t| t.status != TaskStatus::Smashed);
        self.undo.clear_action();

        info!(count, "Smashed tasks cleared");

        let mut events = vec![CoreEvent::SmashedTasksCleared { count }];
        events.extend(self.commit(next));
        events
    }

    /// Create a habit at the head of the collection. It is not active
    /// until spawned.
    pub fn add_habit(
        &mut self,
        title: &str,
        difficulty: Difficulty,
        interval_type: IntervalType,
        options: HabitOptions,
    ) -> Vec<CoreEvent> {
        let Some(title) = clean_title(title) else {
            debug!("Ignoring habit with empty title");
            return Vec::new();
        };

        let habit = Habit {
            id: HabitId::new(),
            title: title.clone(),
            difficulty,
            interval_type,
            next_due_date: options.start_date.unwrap_or_else(|| self.clock.today()),
            times_per_day: clamp_times_per_day(options.times_per_day),
            remaining_today: 0,
            last_spawn_date: None,
            active_bug_state: None,
            created_at: self.clock.now(),
            note: clean_note(options.note),
            checklist: copy_checklist(options.checklist.as_ref()),
        };
        let habit_id = habit.id;

        let mut next = self.document.clone();
        next.habits.insert(0, habit);
        self.undo.clear_action();

        info!(
            habit_id = %habit_id,
            title = %title,
            interval = %interval_type,
            "Habit added"
        );
        self.audit(AuditEventType::HabitAdded { habit_id, title });

        let mut events = vec![CoreEvent::HabitAdded { habit_id }];
        events.extend(self.commit(next));
        events
    }

    /// Edit a habit's fields. Lowering `times_per_day` caps the remaining
    /// completions of an active occurrence.
    pub fn update_habit(&mut self, id: &HabitId, patch: HabitPatch) -> Vec<CoreEvent> {
        let Some(index) = self.document.habit_index(id) else {
            debug!(habit_id = %id, "Update of unknown habit ignored");
            return Vec::new();
        };

        let mut next = self.document.clone();
        let habit = &mut next.habits[index];
        if let Some(title) = patch.title.as_deref().and_then(clean_title) {
            habit.title = title;
        }
        if let Some(difficulty) = patch.difficulty {
            habit.difficulty = difficulty;
        }
        if let Some(interval_type) = patch.interval_type {
            habit.interval_type = interval_type;
        }
        if let Some(times) = patch.times_per_day {
            habit.times_per_day = clamp_times_per_day(times);
            habit.remaining_today = habit.remaining_today.min(habit.times_per_day);
        }
        if let Some(due) = patch.next_due_date {
            habit.next_due_date = due;
        }
        if let Some(note) = patch.note {
            habit.note = clean_note(note);
        }
        if let Some(checklist) = patch.checklist {
            habit.checklist = checklist;
        }

        if next.habits[index] == self.document.habits[index] {
            return Vec::new();
        }

        self.undo.clear_action();
        info!(habit_id = %id, "Habit updated");

        let mut events = vec![CoreEvent::HabitUpdated { habit_id: *id }];
        events.extend(self.commit(next));
        events
    }

    /// Move a habit into the recently-deleted slot
    pub fn delete_habit(&mut self, id: &HabitId) -> Vec<CoreEvent> {
        let Some(index) = self.document.habit_index(id) else {
            debug!(habit_id = %id, "Delete of unknown habit ignored");
            return Vec::new();
        };

        let mut next = self.document.clone();
        let habit = next.habits.remove(index);
        let title = habit.title.clone();

        self.undo.clear_action();
        self.undo.record_delete(Entity::Habit(habit), self.clock.now());

        info!(habit_id = %id, title = %title, "Habit deleted");
        self.audit(AuditEventType::EntityDeleted {
            kind: EntityKind::Habit,
            title: title.clone(),
        });

        let mut events = vec![CoreEvent::Deleted {
            kind: EntityKind::Habit,
            title,
        }];
        events.extend(self.commit(next));
        events
    }

    /// Flip one checklist item's `done` flag
    pub fn toggle_checklist_item(
        &mut self,
        target: EntityRef,
        item_id: &ChecklistItemId,
    ) -> Vec<CoreEvent> {
        let mut next = self.document.clone();
        let checklist = match target {
            EntityRef::Task(id) => next
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .and_then(|t| t.checklist.as_mut()),
            EntityRef::Habit(id) => next
                .habits
                .iter_mut()
                .find(|h| h.id == id)
                .and_then(|h| h.checklist.as_mut()),
        };
        let Some(item) = checklist.and_then(|items| items.iter_mut().find(|i| &i.id == item_id))
        else {
            debug!(item_id = %item_id, "Toggle of unknown checklist item ignored");
            return Vec::new();
        };

        item.done = !item.done;
        let done = item.done;
        self.undo.clear_action();

        debug!(item_id = %item_id, done, "Checklist item toggled");

        let mut events = vec![CoreEvent::ChecklistItemToggled {
            kind: target.kind(),
            item_id: *item_id,
            done,
        }];
        events.extend(self.commit(next));
        events
    }
}
