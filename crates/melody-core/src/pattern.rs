//! Patterns: a named note sequence bound to an action handle.

use crate::action::Action;
use std::fmt;
use std::sync::Arc;

/// A single note event value (MIDI note number, 0-127 in practice).
pub type Note = u8;

/// A configured melody. Immutable after construction.
#[derive(Clone)]
pub struct Pattern {
    name: String,
    sequence: Vec<Note>,
    action: Arc<dyn Action>,
}

impl Pattern {
    pub fn new(
        name: impl Into<String>,
        sequence: impl Into<Vec<Note>>,
        action: impl Action + 'static,
    ) -> Self {
        Self::with_action(name, sequence, Arc::new(action))
    }

    /// Build a pattern around an action handle shared with the host.
    pub fn with_action(
        name: impl Into<String>,
        sequence: impl Into<Vec<Note>>,
        action: Arc<dyn Action>,
    ) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            action,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn sequence(&self) -> &[Note] {
        &self.sequence
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[inline]
    pub fn action(&self) -> &Arc<dyn Action> {
        &self.action
    }

    /// True when `history` ends with this pattern's full sequence.
    #[inline]
    pub fn matches_tail(&self, history: &[Note]) -> bool {
        history.len() >= self.sequence.len() && history.ends_with(&self.sequence)
    }

    #[inline]
    pub(crate) fn trigger(&self) {
        self.action.trigger();
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("name", &self.name)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}
