//! Sound/haptic collaborator

use smash_api::{Difficulty, EntityKind};

/// Side effect fired after a successful smash while sound is on.
/// Nothing it does feeds back into engine state.
pub trait Feedback: Send + Sync {
    fn smashed(&self, kind: EntityKind, difficulty: Difficulty);
}

/// Feedback that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl Feedback for NoFeedback {
    fn smashed(&self, _kind: EntityKind, _difficulty: Difficulty) {}
}
