//! Error types for the melody core.

use thiserror::Error;

/// Startup errors. Fatal to engine construction; nothing here is raised while
/// events are being processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("pattern '{name}' has an empty sequence")]
    EmptySequence { name: String },

    #[error("pattern '{name}' contains note {note}, outside the MIDI range 0-127")]
    NoteOutOfRange { name: String, note: u8 },

    #[error("max_buffer must be at least 1")]
    InvalidMaxBuffer,

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
