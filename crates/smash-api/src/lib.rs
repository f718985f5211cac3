//! Data model for Bug Smasher
//!
//! This crate defines the types shared by the store, the engine and the CLI:
//! - Tasks, habits and their lifecycle states
//! - Difficulty-driven reward and penalty tables, the poison shop catalog
//! - Monthly statistics
//! - The persisted document

mod document;
mod stats;
mod types;

pub use document::*;
pub use stats::*;
pub use types::*;

/// Version written into every persisted document
pub const DOCUMENT_VERSION: u32 = 2;

/// Upper bound of the infestation meter
pub const MAX_INFESTATION: u32 = 10;

/// Default infestation level at which the meter starts warning
pub const DEFAULT_WARNING_THRESHOLD: u32 = 7;

/// Default bound on each monthly item list
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Most tasks a single add may create
pub const MAX_TASK_BATCH: u32 = 10;

/// Most completions a habit may require per day
pub const MAX_TIMES_PER_DAY: u32 = 10;
