//! Subcommands and their execution against the engine

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use smash_api::{ChecklistItem, Difficulty, IntervalType, PoisonSize};
use smash_core::{
    CoreEvent, Engine, EntityRef, HabitOptions, HabitPatch, TaskOptions, TaskPatch,
};

use crate::{lookup, render};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage one-off tasks
    Task {
        #[command(subcommand)]
        action: TaskCommand,
    },

    /// Manage recurring habits
    Habit {
        #[command(subcommand)]
        action: HabitCommand,
    },

    /// Activate habits due on a date (default: today)
    Spawn {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Buy poison to push the infestation back
    Shop { size: PoisonSize },

    /// Revert the last unlock, smash, completion or failure
    Undo,

    /// Bring back the last deleted task or habit
    Restore,

    /// Monthly statistics (default: this month)
    Stats {
        /// Month as YYYY-MM
        month: Option<String>,
    },

    /// Coins, infestation, tasks and habits
    Status,

    /// Turn smash sounds on or off
    Sound { state: Toggle },

    /// Recent audit log entries
    History {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Interactive session; keeps undo and restore available between
    /// commands
    Session,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a task (or several numbered copies)
    Add {
        title: String,
        #[arg(short, long, default_value = "easy")]
        difficulty: Difficulty,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
        #[arg(long)]
        note: Option<String>,
        /// Checklist item (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
    },

    /// Edit a task's title, difficulty or note
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        #[arg(long)]
        clear_note: bool,
    },

    /// Mark a task done, ready to smash
    Unlock { id: String },

    /// Smash an unlocked task for coins
    Smash { id: String },

    /// Give up on a task; the bug escapes
    Fail { id: String },

    /// Delete a task (restorable for a short while)
    Delete { id: String },

    /// Toggle a checklist item by position
    Check { id: String, position: usize },

    /// Remove all smashed tasks
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum HabitCommand {
    /// Add a habit
    Add {
        title: String,
        #[arg(short, long, default_value = "easy")]
        difficulty: Difficulty,
        #[arg(short, long, default_value = "daily")]
        interval: IntervalType,
        /// Completions required per occurrence
        #[arg(short, long, default_value_t = 1)]
        times: u32,
        /// First due date (default: today)
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        note: Option<String>,
        /// Checklist item (repeatable)
        #[arg(long = "item")]
        items: Vec<String>,
    },

    /// Edit a habit
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
        #[arg(short, long)]
        interval: Option<IntervalType>,
        #[arg(short, long)]
        times: Option<u32>,
        /// Next due date
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long, conflicts_with = "clear_note")]
        note: Option<String>,
        #[arg(long)]
        clear_note: bool,
    },

    /// Log one completion of today's occurrence
    Tick { id: String },

    /// Smash an unlocked occurrence for coins
    Smash { id: String },

    /// Give up on today's occurrence
    Fail { id: String },

    /// Delete a habit (restorable for a short while)
    Delete { id: String },

    /// Toggle a checklist item by position
    Check { id: String, position: usize },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

fn checklist(items: Vec<String>) -> Option<Vec<ChecklistItem>> {
    if items.is_empty() {
        None
    } else {
        Some(items.into_iter().map(ChecklistItem::new).collect())
    }
}

fn note_patch(note: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear { Some(None) } else { note.map(Some) }
}

/// Run one command. `Session` is handled by the caller.
pub fn execute(engine: &mut Engine, command: Command) -> Result<()> {
    let events = match command {
        Command::Task { action } => task(engine, action)?,
        Command::Habit { action } => habit(engine, action)?,
        Command::Spawn { date } => match date {
            Some(date) => engine.spawn_due_habits(date),
            None => engine.spawn_due_habits_today(),
        },
        Command::Shop { size } => {
            let events = engine.buy_poison(size);
            if events.is_empty() {
                println!(
                    "Not enough coins: {} poison costs {}, you have {}",
                    size,
                    size.cost(),
                    engine.document().coins
                );
                return Ok(());
            }
            events
        }
        Command::Undo => engine.undo_last_action(),
        Command::Restore => engine.undo_delete(),
        Command::Stats { month } => {
            let month = match month {
                Some(m) if smash_util::parse_month_key(&m).is_some() => m,
                Some(m) => bail!("Invalid month '{}', expected YYYY-MM", m),
                None => engine.current_month(),
            };
            render::stats(&month, &engine.month_summary(&month));
            return Ok(());
        }
        Command::Status => {
            render::status(engine);
            return Ok(());
        }
        Command::Sound { state } => engine.set_sound(state == Toggle::On),
        Command::History { limit } => {
            render::history(&engine.recent_audits(limit))?;
            return Ok(());
        }
        Command::Session => bail!("Already in a session"),
    };

    render::events(engine, &events);
    Ok(())
}

fn task(engine: &mut Engine, action: TaskCommand) -> Result<Vec<CoreEvent>> {
    let doc = engine.document();
    let events = match action {
        TaskCommand::Add {
            title,
            difficulty,
            count,
            note,
            items,
        } => engine.add_task(
            &title,
            difficulty,
            TaskOptions {
                count,
                note,
                checklist: checklist(items),
            },
        ),
        TaskCommand::Edit {
            id,
            title,
            difficulty,
            note,
            clear_note,
        } => {
            let id = lookup::task_id(doc, &id)?;
            engine.update_task(
                &id,
                TaskPatch {
                    title,
                    difficulty,
                    note: note_patch(note, clear_note),
                    checklist: None,
                },
            )
        }
        TaskCommand::Unlock { id } => {
            let id = lookup::task_id(doc, &id)?;
            engine.unlock_task(&id)
        }
        TaskCommand::Smash { id } => {
            let id = lookup::task_id(doc, &id)?;
            engine.smash_task(&id)
        }
        TaskCommand::Fail { id } => {
            let id = lookup::task_id(doc, &id)?;
            engine.fail_task(&id)
        }
        TaskCommand::Delete { id } => {
            let id = lookup::task_id(doc, &id)?;
            engine.delete_task(&id)
        }
        TaskCommand::Check { id, position } => {
            let id = lookup::task_id(doc, &id)?;
            let checklist = doc.task(&id).and_then(|t| t.checklist.as_ref());
            let item_id = lookup::checklist_item(checklist, position)
                .with_context(|| format!("Task {}", id.short()))?;
            engine.toggle_checklist_item(EntityRef::Task(id), &item_id)
        }
        TaskCommand::Clear => engine.clear_smashed_tasks(),
    };
    Ok(events)
}

fn habit(engine: &mut Engine, action: HabitCommand) -> Result<Vec<CoreEvent>> {
    let doc = engine.document();
    let events = match action {
        HabitCommand::Add {
            title,
            difficulty,
            interval,
            times,
            start,
            note,
            items,
        } => engine.add_habit(
            &title,
            difficulty,
            interval,
            HabitOptions {
                times_per_day: times,
                note,
                checklist: checklist(items),
                start_date: start,
            },
        ),
        HabitCommand::Edit {
            id,
            title,
            difficulty,
            interval,
            times,
            due,
            note,
            clear_note,
        } => {
            let id = lookup::habit_id(doc, &id)?;
            engine.update_habit(
                &id,
                HabitPatch {
                    title,
                    difficulty,
                    interval_type: interval,
                    times_per_day: times,
                    next_due_date: due,
                    note: note_patch(note, clear_note),
                    checklist: None,
                },
            )
        }
        HabitCommand::Tick { id } => {
            let id = lookup::habit_id(doc, &id)?;
            engine.complete_habit_occurrence(&id)
        }
        HabitCommand::Smash { id } => {
            let id = lookup::habit_id(doc, &id)?;
            engine.smash_habit(&id)
        }
        HabitCommand::Fail { id } => {
            let id = lookup::habit_id(doc, &id)?;
            engine.fail_habit(&id)
        }
        HabitCommand::Delete { id } => {
            let id = lookup::habit_id(doc, &id)?;
            engine.delete_habit(&id)
        }
        HabitCommand::Check { id, position } => {
            let id = lookup::habit_id(doc, &id)?;
            let checklist = doc.habit(&id).and_then(|h| h.checklist.as_ref());
            let item_id = lookup::checklist_item(checklist, position)
                .with_context(|| format!("Habit {}", id.short()))?;
            engine.toggle_checklist_item(EntityRef::Habit(id), &item_id)
        }
    };
    Ok(events)
}
