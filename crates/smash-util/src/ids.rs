//! Strongly-typed identifiers for Bug Smasher

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a one-off task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short form used for display and prefix lookup
    pub fn short(&self) -> String {
        short_form(&self.0)
    }

    pub fn matches_prefix(&self, prefix: &str) -> bool {
        matches_prefix(&self.0, prefix)
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a recurring habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn short(&self) -> String {
        short_form(&self.0)
    }

    pub fn matches_prefix(&self, prefix: &str) -> bool {
        matches_prefix(&self.0, prefix)
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a checklist item inside a task or habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecklistItemId(Uuid);

impl ChecklistItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn short(&self) -> String {
        short_form(&self.0)
    }

    pub fn matches_prefix(&self, prefix: &str) -> bool {
        matches_prefix(&self.0, prefix)
    }
}

impl Default for ChecklistItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChecklistItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn short_form(uuid: &Uuid) -> String {
    uuid.simple().to_string()[..8].to_string()
}

fn matches_prefix(uuid: &Uuid, prefix: &str) -> bool {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        return false;
    }
    uuid.hyphenated().to_string().starts_with(&prefix)
        || uuid.simple().to_string().starts_with(&prefix)
}
