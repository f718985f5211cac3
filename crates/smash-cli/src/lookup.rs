//! Resolving user-typed id prefixes

use anyhow::{bail, Result};
use smash_api::{ChecklistItem, Document};
use smash_util::{ChecklistItemId, HabitId, TaskId};

fn single<T: Copy>(matches: &[T], kind: &str, prefix: &str) -> Result<T> {
    match matches {
        [] => bail!("No {} matches '{}'", kind, prefix),
        [one] => Ok(*one),
        _ => bail!(
            "'{}' matches {} {}s; use a longer prefix",
            prefix,
            matches.len(),
            kind
        ),
    }
}

pub fn task_id(document: &Document, prefix: &str) -> Result<TaskId> {
    let matches: Vec<TaskId> = document
        .tasks
        .iter()
        .filter(|t| t.id.matches_prefix(prefix))
        .map(|t| t.id)
        .collect();
    single(&matches, "task", prefix)
}

pub fn habit_id(document: &Document, prefix: &str) -> Result<HabitId> {
    let matches: Vec<HabitId> = document
        .habits
        .iter()
        .filter(|h| h.id.matches_prefix(prefix))
        .map(|h| h.id)
        .collect();
    single(&matches, "habit", prefix)
}

/// Checklist item by its 1-based position
pub fn checklist_item(checklist: Option<&Vec<ChecklistItem>>, position: usize) -> Result<ChecklistItemId> {
    let Some(items) = checklist else {
        bail!("No checklist");
    };
    match position.checked_sub(1).and_then(|i| items.get(i)) {
        Some(item) => Ok(item.id),
        None => bail!("Checklist has {} items; got {}", items.len(), position),
    }
}
