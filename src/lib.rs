//! # Melody - MIDI melody triggers
//!
//! Listens to a MIDI controller, recognizes configured melodies at the tail of
//! the note stream, and fires one action per recognized melody.
//!
//! ## Architecture
//!
//! Melody is an umbrella crate that coordinates:
//! - **melody-core** - History buffer, suffix matcher, actions, configuration
//! - **melody-midi-io** - Note-on filter, matcher worker thread, hardware input and thru
//!
//! ## Quick Start
//!
//! ```ignore
//! use melody::prelude::*;
//!
//! let config = MelodyConfig::load("melody.json")?;
//! let mut host = MelodyHost::builder()
//!     .config(config)
//!     .action("Doorbell", || println!("ding"))
//!     .build()?;
//!
//! host.start()?;
//! for m in host.matches().iter() {
//!     println!("matched {}", m.name);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Hardware MIDI
//! - `midi-hardware` - midir input and thru output

/// Re-export of melody-core for direct access
pub use melody_core as core;

/// Re-export of melody-midi-io for direct access
pub use melody_midi_io as midi;

pub use melody_core::{
    Action, ActionConfig, FilterConfig, MatchOutcome, MelodyConfig, Note, Pattern,
    PatternConfig, PortSelector, SequenceMatcher, SwitchEvent, SwitchEventKind,
};

pub use melody_midi_io::{MatchNotification, MidiThru, NoteOnFilter};

#[cfg(feature = "midi-hardware")]
pub use melody_midi_io::{MidiInputDevice, MidiOutputDevice};

pub mod error;
pub use error::{Error, Result};

mod builder;
mod host;

pub use builder::MelodyHostBuilder;
pub use host::MelodyHost;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{MelodyHost, MelodyHostBuilder};

    pub use crate::{
        Action, MatchNotification, MatchOutcome, MelodyConfig, PatternConfig, SequenceMatcher,
        SwitchEvent, SwitchEventKind,
    };
}
