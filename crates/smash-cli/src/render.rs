//! Plain-text output

use anyhow::Result;
use smash_api::{
    BugState, Habit, InfestationLevel, MonthlyStats, Task, TaskStatus, MAX_INFESTATION,
};
use smash_core::{CoreEvent, Engine};
use smash_store::AuditEvent;
use smash_util::{format_datetime_full, format_duration};

/// Items shown per list in the stats view
const STATS_ITEMS_SHOWN: usize = 5;

pub fn events(engine: &Engine, events: &[CoreEvent]) {
    if events.is_empty() {
        println!("Nothing happened");
        return;
    }

    for event in events {
        match event {
            CoreEvent::TasksAdded { task_ids } => {
                for id in task_ids {
                    if let Some(task) = engine.document().task(id) {
                        println!("Added task {} {}", id.short(), task.title);
                    }
                }
            }
            CoreEvent::TaskUpdated { task_id } => println!("Updated task {}", task_id.short()),
            CoreEvent::TaskUnlocked { task_id } => {
                println!("Unlocked task {}; smash it to collect", task_id.short())
            }
            CoreEvent::TaskSmashed { coins_awarded, .. } => {
                println!("SMASH! +{} coins", coins_awarded)
            }
            CoreEvent::TaskFailed {
                infestation_added, ..
            } => println!("The bug escaped: infestation +{}", infestation_added),
            CoreEvent::SmashedTasksCleared { count } => {
                println!("Cleared {} smashed tasks", count)
            }
            CoreEvent::HabitAdded { habit_id } => {
                if let Some(habit) = engine.document().habit(habit_id) {
                    println!(
                        "Added habit {} {} (first due {})",
                        habit_id.short(),
                        habit.title,
                        habit.next_due_date
                    );
                }
            }
            CoreEvent::HabitUpdated { habit_id } => println!("Updated habit {}", habit_id.short()),
            CoreEvent::HabitsSpawned { habit_ids, missed } => {
                println!("{} habits due", habit_ids.len());
                if !missed.is_empty() {
                    println!("{} unfinished from before counted as missed", missed.len());
                }
            }
            CoreEvent::HabitOccurrenceCompleted {
                remaining_today,
                unlocked,
                ..
            } => {
                if *unlocked {
                    println!("All done; smash it to collect");
                } else {
                    println!("{} to go", remaining_today);
                }
            }
            CoreEvent::HabitSmashed {
                coins_awarded,
                next_due_date,
                ..
            } => println!("SMASH! +{} coins, next due {}", coins_awarded, next_due_date),
            CoreEvent::HabitFailed {
                infestation_added,
                next_due_date,
                ..
            } => println!(
                "Missed: infestation +{}, next due {}",
                infestation_added, next_due_date
            ),
            CoreEvent::ChecklistItemToggled { done, .. } => {
                println!("Checklist item {}", if *done { "done" } else { "open" })
            }
            CoreEvent::Deleted { kind, title } => {
                let window = engine.restore_remaining().unwrap_or_default();
                println!(
                    "Deleted {} '{}' (restore within {})",
                    kind,
                    title,
                    format_duration(window)
                );
            }
            CoreEvent::Restored { kind, title } => println!("Restored {} '{}'", kind, title),
            CoreEvent::Undone { kind, title } => println!("Undid last action on {} '{}'", kind, title),
            CoreEvent::UndoExpired => println!("(undo window closed)"),
            CoreEvent::RestoreExpired => println!("(restore window closed)"),
            CoreEvent::PoisonBought {
                size,
                cost,
                infestation_cleared,
            } => println!(
                "Bought {} poison for {} coins: infestation -{}",
                size, cost, infestation_cleared
            ),
            CoreEvent::InfestationLevelChanged { to, .. } => match to {
                InfestationLevel::Clear => println!("The infestation is under control"),
                InfestationLevel::Warning => println!("Warning: the bugs are multiplying"),
                InfestationLevel::Overrun => println!("OVERRUN! Buy poison to fight back"),
            },
            CoreEvent::SoundToggled { on } => {
                println!("Sound {}", if *on { "on" } else { "off" })
            }
        }
    }
}

fn meter(infestation: u32) -> String {
    let filled = infestation.min(MAX_INFESTATION) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(MAX_INFESTATION as usize - filled)
    )
}

fn task_line(task: &Task) -> String {
    let status = match task.status {
        TaskStatus::Locked => "locked",
        TaskStatus::Unlocked => "UNLOCKED",
        TaskStatus::Smashed => "smashed",
    };
    format!(
        "  {}  {:<8}  {:<6}  {}",
        task.id.short(),
        status,
        task.difficulty,
        task.title
    )
}

fn habit_line(habit: &Habit) -> String {
    let state = match habit.active_bug_state {
        Some(BugState::Locked) => format!("{} left", habit.remaining_today),
        Some(BugState::Unlocked) => "UNLOCKED".to_string(),
        None => format!("due {}", habit.next_due_date),
    };
    format!(
        "  {}  {:<14}  {:<6}  {:<7}  {}",
        habit.id.short(),
        state,
        habit.difficulty,
        habit.interval_type,
        habit.title
    )
}

fn checklist_lines(checklist: Option<&Vec<smash_api::ChecklistItem>>) -> Vec<String> {
    checklist
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    format!(
                        "              {}. [{}] {}",
                        i + 1,
                        if item.done { "x" } else { " " },
                        item.text
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn status(engine: &Engine) {
    let doc = engine.document();

    println!("Coins:       {}", doc.coins);
    println!(
        "Infestation: {} {}/{} ({:?})",
        meter(doc.infestation),
        doc.infestation,
        MAX_INFESTATION,
        engine.infestation_level()
    );
    if let Some(left) = engine.undo_remaining() {
        println!("Undo available for {}", format_duration(left));
    }
    if let Some(left) = engine.restore_remaining() {
        println!("Restore available for {}", format_duration(left));
    }

    println!();
    println!("Tasks ({})", doc.tasks.len());
    for task in &doc.tasks {
        println!("{}", task_line(task));
        if let Some(note) = &task.note {
            println!("              {}", note);
        }
        for line in checklist_lines(task.checklist.as_ref()) {
            println!("{}", line);
        }
    }

    println!();
    println!("Habits ({})", doc.habits.len());
    for habit in &doc.habits {
        println!("{}", habit_line(habit));
        if let Some(note) = &habit.note {
            println!("              {}", note);
        }
        for line in checklist_lines(habit.checklist.as_ref()) {
            println!("{}", line);
        }
    }
}

pub fn stats(month: &str, stats: &MonthlyStats) {
    println!("{}", month);
    println!("  Smashed: {}", stats.smashed_count);
    println!("  Missed:  {}", stats.missed_count);
    if let Some(rate) = stats.success_rate() {
        println!("  Success: {:.0}%", rate * 100.0);
    }

    for (label, items) in [("smashed", &stats.smashed_items), ("missed", &stats.missed_items)] {
        if items.is_empty() {
            continue;
        }
        println!("  Recently {}:", label);
        for item in items.iter().rev().take(STATS_ITEMS_SHOWN) {
            println!(
                "    {}  {:<5}  {:<6}  {}",
                format_datetime_full(&item.at),
                item.kind,
                item.difficulty,
                item.title
            );
        }
    }
}

pub fn history(audits: &[AuditEvent]) -> Result<()> {
    for audit in audits {
        println!(
            "{}  {}",
            format_datetime_full(&audit.timestamp),
            serde_json::to_string(&audit.event)?
        );
    }
    Ok(())
}
