//! Streaming suffix matcher.
//!
//! Owns the history buffer and the pattern table for one input stream. Every
//! note is appended to the buffer, then the buffer's tail is compared against
//! each pattern in table order. The first pattern whose whole sequence ends at
//! the newest note wins: its action fires once and the buffer is cleared.
//! Without a match, the oldest notes are dropped so the buffer stays within
//! its bound.
//!
//! `on_event` must be serialized by the caller. It never blocks and never
//! fails; notes that never complete a pattern simply age out.

use crate::error::{ConfigError, Result};
use crate::pattern::{Note, Pattern};
use tracing::{debug, info, warn};

/// History bound used by [`SequenceMatcher::new`].
pub const DEFAULT_MAX_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    NoMatch,
    /// Index into the pattern table of the pattern that fired.
    Matched(usize),
}

impl MatchOutcome {
    #[inline]
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    #[inline]
    pub fn pattern_index(&self) -> Option<usize> {
        match *self {
            MatchOutcome::Matched(index) => Some(index),
            MatchOutcome::NoMatch => None,
        }
    }
}

#[derive(Debug)]
pub struct SequenceMatcher {
    patterns: Vec<Pattern>,
    buffer: Vec<Note>,
    max_buffer: usize,
}

impl SequenceMatcher {
    pub fn new(patterns: Vec<Pattern>) -> Result<Self> {
        Self::with_max_buffer(patterns, DEFAULT_MAX_BUFFER)
    }

    /// The effective bound is `max(max_buffer, longest pattern)` so that every
    /// pattern stays recognizable.
    pub fn with_max_buffer(patterns: Vec<Pattern>, max_buffer: usize) -> Result<Self> {
        if let Some(empty) = patterns.iter().find(|p| p.is_empty()) {
            return Err(ConfigError::EmptySequence {
                name: empty.name().to_string(),
            });
        }

        let longest = patterns.iter().map(Pattern::len).max().unwrap_or(0);
        let bound = max_buffer.max(longest);
        if bound > max_buffer {
            warn!(
                "max_buffer {} is shorter than the longest pattern, extending to {}",
                max_buffer, bound
            );
        }

        for pattern in &patterns {
            info!("New melody: {} {:?}", pattern.name(), pattern.sequence());
        }

        Ok(Self {
            patterns,
            // Capacity is capped; the bound comes from user config.
            buffer: Vec::with_capacity(bound.min(DEFAULT_MAX_BUFFER).saturating_add(1)),
            max_buffer: bound,
        })
    }

    /// Append `note` and run one match pass.
    pub fn on_event(&mut self, note: Note) -> MatchOutcome {
        self.buffer.push(note);

        if let Some(index) = self
            .patterns
            .iter()
            .position(|p| p.matches_tail(&self.buffer))
        {
            let pattern = &self.patterns[index];
            info!("Match found: {}", pattern.name());
            self.buffer.clear();
            pattern.trigger();
            return MatchOutcome::Matched(index);
        }

        if self.buffer.len() > self.max_buffer {
            let excess = self.buffer.len() - self.max_buffer;
            self.buffer.drain(..excess);
        }
        debug!(note, buffered = self.buffer.len(), "No match");
        MatchOutcome::NoMatch
    }

    /// Drop all buffered history.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn pattern(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Buffered notes, oldest first.
    pub fn buffer(&self) -> &[Note] {
        &self.buffer
    }

    /// Effective trim bound.
    pub fn max_buffer(&self) -> usize {
        self.max_buffer
    }
}
