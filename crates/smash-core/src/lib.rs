//! Task & reward engine for Bug Smasher
//!
//! This crate is the heart of Bug Smasher, containing:
//! - Entity store (tasks: Locked -> Unlocked -> Smashed, habits)
//! - Recurrence scheduler (spawning and advancing habits)
//! - Reward ledger (coins, infestation, monthly stats, poison shop)
//! - Undo/recovery log (single-slot undo and restore, time-boxed)
//!
//! Every operation computes the next document in full and commits it in
//! one step, then hands it to the [`smash_store::Store`]. Operations whose
//! preconditions do not hold return no events and change nothing.

mod engine;
mod entities;
mod events;
mod feedback;
mod ledger;
mod schedule;
mod undo;

#[cfg(test)]
mod testing;

pub use engine::*;
pub use entities::*;
pub use events::*;
pub use feedback::*;
pub use ledger::*;
pub use undo::*;
