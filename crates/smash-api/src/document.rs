//! The persisted document

use serde::{Deserialize, Serialize};
use smash_util::{HabitId, TaskId};
use std::collections::BTreeMap;

use crate::{BugState, Habit, InfestationLevel, MonthlyStats, Task, DOCUMENT_VERSION, MAX_INFESTATION};

/// User preferences stored alongside the game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_sound_on")]
    pub sound_on: bool,
}

fn default_sound_on() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_on: default_sound_on(),
        }
    }
}

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// Everything the engine owns, persisted as one blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub infestation: u32,
    /// Keyed by `YYYY-MM`
    #[serde(default)]
    pub monthly_stats: BTreeMap<String, MonthlyStats>,
    #[serde(default)]
    pub settings: Settings,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            tasks: Vec::new(),
            habits: Vec::new(),
            coins: 0,
            infestation: 0,
            monthly_stats: BTreeMap::new(),
            settings: Settings::default(),
        }
    }
}

impl Document {
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn task_index(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    pub fn habit(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| &h.id == id)
    }

    pub fn habit_index(&self, id: &HabitId) -> Option<usize> {
        self.habits.iter().position(|h| &h.id == id)
    }

    /// Infestation is at its maximum
    pub fn is_overrun(&self) -> bool {
        self.infestation >= MAX_INFESTATION
    }

    pub fn infestation_level(&self, warning_threshold: u32) -> InfestationLevel {
        InfestationLevel::classify(self.infestation, warning_threshold)
    }

    /// Stats for a month, created empty on first use
    pub fn month_mut(&mut self, key: &str) -> &mut MonthlyStats {
        self.monthly_stats.entry(key.to_string()).or_default()
    }

    /// Re-establish invariants on data that came from outside the engine
    pub fn normalize(&mut self) {
        self.version = DOCUMENT_VERSION;
        self.infestation = self.infestation.min(MAX_INFESTATION);
        for habit in &mut self.habits {
            habit.times_per_day = habit.times_per_day.clamp(1, crate::MAX_TIMES_PER_DAY);
            habit.remaining_today = habit.remaining_today.min(habit.times_per_day);
            // Nothing left to complete, so the reward is already earned
            if habit.active_bug_state == Some(BugState::Locked) && habit.remaining_today == 0 {
                habit.active_bug_state = Some(BugState::Unlocked);
            }
        }
    }

    /// Bound every month's item lists to `limit`
    pub fn trim_history(&mut self, limit: usize) {
        for stats in self.monthly_stats.values_mut() {
            stats.trim(limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_default_document() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, Document::default());
        assert!(doc.settings.sound_on);
    }

    #[test]
    fn keys_are_camel_case() {
        let mut doc = Document::default();
        doc.month_mut("2025-01").smashed_count = 3;
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["monthlyStats"]["2025-01"]["smashedCount"], 3);
        assert_eq!(json["settings"]["soundOn"], true);
        assert_eq!(json["version"], DOCUMENT_VERSION);
    }

    #[test]
    fn normalize_clamps_infestation() {
        let mut doc = Document {
            infestation: 42,
            ..Default::default()
        };
        doc.normalize();
        assert_eq!(doc.infestation, MAX_INFESTATION);
        assert!(doc.is_overrun());
    }

    #[test]
    fn normalize_unlocks_finished_occurrence() {
        let json = r#"{"habits":[{
            "id":"6f1c2a4e-8a52-4f0e-9f62-0d3c7b1e2a10",
            "title":"Floss","difficulty":"easy","intervalType":"daily",
            "nextDueDate":"2025-06-01","timesPerDay":2,"remainingToday":0,
            "lastSpawnDate":"2025-06-01","activeBugState":"locked",
            "createdAt":"2025-06-01T08:00:00+00:00"}]}"#;
        let mut doc: Document = serde_json::from_str(json).unwrap();

        doc.normalize();
        assert_eq!(doc.habits[0].active_bug_state, Some(BugState::Unlocked));
    }
}
