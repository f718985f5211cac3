//! Shared types for Bug Smasher entities

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use smash_util::{ChecklistItemId, HabitId, TaskId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing one of the named enums from user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: '{value}' (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// How hard an item is. Drives both reward size and failure penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Boss,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Boss,
    ];

    /// Coins credited for smashing an item of this difficulty
    pub fn coin_reward(self) -> u64 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Boss => 5,
        }
    }

    /// Infestation added when an item of this difficulty is missed
    pub fn infestation_weight(self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Boss => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Boss => "boss",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            "boss" => Ok(Difficulty::Boss),
            other => Err(ParseEnumError {
                kind: "difficulty",
                value: other.to_string(),
                expected: "easy, medium, hard, boss",
            }),
        }
    }
}

/// Lifecycle of a one-off task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Locked,
    Unlocked,
    Smashed,
}

/// Recurrence rule of a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    Daily,
    Weekly,
    Monthly,
}

impl IntervalType {
    /// Next due date after `from`
    pub fn advance(self, from: NaiveDate) -> NaiveDate {
        match self {
            IntervalType::Daily => smash_util::add_days(from, 1),
            IntervalType::Weekly => smash_util::add_days(from, 7),
            IntervalType::Monthly => smash_util::add_months_clamped(from, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntervalType::Daily => "daily",
            IntervalType::Weekly => "weekly",
            IntervalType::Monthly => "monthly",
        }
    }
}

impl fmt::Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for IntervalType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(IntervalType::Daily),
            "weekly" => Ok(IntervalType::Weekly),
            "monthly" => Ok(IntervalType::Monthly),
            other => Err(ParseEnumError {
                kind: "interval",
                value: other.to_string(),
                expected: "daily, weekly, monthly",
            }),
        }
    }
}

/// State of a habit's current occurrence. `None` on the habit means the
/// habit is not due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugState {
    Locked,
    Unlocked,
}

/// One line of a task or habit checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ChecklistItemId,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ChecklistItemId::new(),
            text: text.into(),
            done: false,
        }
    }

    /// Same text and state under a fresh id
    pub fn duplicate(&self) -> Self {
        Self {
            id: ChecklistItemId::new(),
            text: self.text.clone(),
            done: self.done,
        }
    }
}

/// A one-off item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub difficulty: Difficulty,
    pub status: TaskStatus,
    pub created_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
}

/// A recurring item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    pub difficulty: Difficulty,
    pub interval_type: IntervalType,
    pub next_due_date: NaiveDate,
    pub times_per_day: u32,
    #[serde(default)]
    pub remaining_today: u32,
    #[serde(default)]
    pub last_spawn_date: Option<NaiveDate>,
    #[serde(default)]
    pub active_bug_state: Option<BugState>,
    pub created_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl Habit {
    /// Whether the habit should spawn on `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_due_date <= today && self.last_spawn_date != Some(today)
    }

    pub fn is_active(&self) -> bool {
        self.active_bug_state.is_some()
    }
}

/// A task or habit, as held by the undo and recently-deleted slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "entity", rename_all = "snake_case")]
pub enum Entity {
    Task(Task),
    Habit(Habit),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Task(_) => EntityKind::Task,
            Entity::Habit(_) => EntityKind::Habit,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Entity::Task(t) => &t.title,
            Entity::Habit(h) => &h.title,
        }
    }
}

/// Discriminant of [`Entity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Task,
    Habit,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Task => f.pad("task"),
            EntityKind::Habit => f.pad("habit"),
        }
    }
}

/// Poison sizes sold in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoisonSize {
    Small,
    Medium,
    Large,
}

impl PoisonSize {
    pub const ALL: [PoisonSize; 3] = [PoisonSize::Small, PoisonSize::Medium, PoisonSize::Large];

    /// Price in coins
    pub fn cost(self) -> u64 {
        match self {
            PoisonSize::Small => 5,
            PoisonSize::Medium => 12,
            PoisonSize::Large => 18,
        }
    }

    /// Infestation removed
    pub fn clears(self) -> u32 {
        match self {
            PoisonSize::Small => 1,
            PoisonSize::Medium => 3,
            PoisonSize::Large => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PoisonSize::Small => "small",
            PoisonSize::Medium => "medium",
            PoisonSize::Large => "large",
        }
    }
}

impl fmt::Display for PoisonSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PoisonSize {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" => Ok(PoisonSize::Small),
            "medium" => Ok(PoisonSize::Medium),
            "large" => Ok(PoisonSize::Large),
            other => Err(ParseEnumError {
                kind: "poison size",
                value: other.to_string(),
                expected: "small, medium, large",
            }),
        }
    }
}

/// Derived severity of the infestation meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfestationLevel {
    Clear,
    Warning,
    Overrun,
}

impl InfestationLevel {
    pub fn classify(infestation: u32, warning_threshold: u32) -> Self {
        if infestation >= crate::MAX_INFESTATION {
            InfestationLevel::Overrun
        } else if infestation >= warning_threshold {
            InfestationLevel::Warning
        } else {
            InfestationLevel::Clear
        }
    }
}
