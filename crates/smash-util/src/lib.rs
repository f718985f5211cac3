//! Shared utilities for Bug Smasher
//!
//! This crate provides:
//! - ID types (TaskId, HabitId, ChecklistItemId)
//! - Clock capability (system, mock and manual clocks) and calendar helpers
//! - Default paths for config and data directories

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
