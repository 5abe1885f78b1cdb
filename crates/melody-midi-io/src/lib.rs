//! MIDI I/O for the melody matcher.
//!
//! Provides note-on filtering, the worker thread that owns a
//! [`SequenceMatcher`](melody_core::SequenceMatcher), and hardware input/thru
//! output via midir.
//!
//! Feature gates: `midi-io` (hardware I/O).

pub mod error;
pub use error::{Error, Result};

mod event;
pub use event::{NoteOnFilter, RawMessage};

mod thru;
pub use thru::MidiThru;

mod worker;
pub use worker::{MatchNotification, MatcherWorker, MessageSender};

#[cfg(feature = "midi-io")]
pub(crate) mod io;

#[cfg(feature = "midi-io")]
pub use io::{MidiInputDevice, MidiInputManager, MidiOutputDevice, MidiOutputManager, MidiOutputMessage};

pub use melody_core::Note;
