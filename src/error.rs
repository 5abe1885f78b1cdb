//! Centralized error type for the melody umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config: {0}")]
    Config(#[from] melody_core::ConfigError),

    #[error("MIDI: {0}")]
    Midi(#[from] melody_midi_io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
