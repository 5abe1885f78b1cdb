//! Melody recognition core.
//!
//! Recognizes configured note sequences at the tail of a live note stream and
//! fires exactly one action per recognized sequence.
//!
//! # Example
//!
//! ```
//! use melody_core::{MatchOutcome, Pattern, SequenceMatcher};
//!
//! let patterns = vec![
//!     Pattern::new("A", vec![60, 62, 64], || println!("A played")),
//!     Pattern::new("B", vec![64], || println!("B played")),
//! ];
//! let mut matcher = SequenceMatcher::new(patterns)?;
//!
//! assert_eq!(matcher.on_event(60), MatchOutcome::NoMatch);
//! assert_eq!(matcher.on_event(62), MatchOutcome::NoMatch);
//! assert_eq!(matcher.on_event(64), MatchOutcome::Matched(0));
//! assert!(matcher.buffer().is_empty());
//! # Ok::<(), melody_core::ConfigError>(())
//! ```

pub mod error;
pub use error::{ConfigError, Result};

pub mod action;
pub use action::{Action, CommandAction, LogAction, SwitchAction, SwitchEvent, SwitchEventKind};

mod pattern;
pub use pattern::{Note, Pattern};

mod matcher;
pub use matcher::{MatchOutcome, SequenceMatcher, DEFAULT_MAX_BUFFER};

pub mod config;
pub use config::{ActionConfig, FilterConfig, MelodyConfig, PatternConfig, PortSelector};
