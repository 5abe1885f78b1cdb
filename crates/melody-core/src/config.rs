//! JSON configuration for a melody host.
//!
//! ```json
//! {
//!   "input": { "name": "Launchkey" },
//!   "thru": { "index": 0 },
//!   "max_buffer": 64,
//!   "filter": { "channel": 0, "ignore_zero_velocity": false },
//!   "patterns": [
//!     { "name": "Lights", "sequence": [60, 62, 64] },
//!     { "name": "Fan", "sequence": [64], "action": { "type": "log" } }
//!   ]
//! }
//! ```
//!
//! Platform-style configs are also accepted: `accessories` for `patterns`,
//! and a numeric `port` for the thru output index.

use crate::action::{Action, CommandAction, LogAction, SwitchAction, SwitchEvent};
use crate::error::{ConfigError, Result};
use crate::matcher::DEFAULT_MAX_BUFFER;
use crate::pattern::{Note, Pattern};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Highest valid MIDI data byte.
const MAX_NOTE: Note = 127;

/// Selects a hardware port by index or by (case-insensitive, partial) name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSelector {
    Index(usize),
    Name(String),
}

impl Default for PortSelector {
    fn default() -> Self {
        PortSelector::Index(0)
    }
}

/// Which raw messages count as notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 0-based MIDI channel; `None` accepts every channel.
    pub channel: Option<u8>,
    /// Treat note-on with velocity 0 as a release and skip it.
    pub ignore_zero_velocity: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            channel: Some(0),
            ignore_zero_velocity: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    #[default]
    Switch,
    Log,
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternConfig {
    pub name: String,
    pub sequence: Vec<Note>,
    #[serde(default)]
    pub action: ActionConfig,
}

impl PatternConfig {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<Note>>) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            action: ActionConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sequence.is_empty() {
            return Err(ConfigError::EmptySequence {
                name: self.name.clone(),
            });
        }
        if let Some(&note) = self.sequence.iter().find(|&&n| n > MAX_NOTE) {
            return Err(ConfigError::NoteOutOfRange {
                name: self.name.clone(),
                note,
            });
        }
        Ok(())
    }

    /// Build the configured action. `label_index` is this pattern's 1-based
    /// table position; `switch_events` receives presses from switch actions.
    pub fn build_action(
        &self,
        label_index: usize,
        switch_events: &Sender<SwitchEvent>,
    ) -> Arc<dyn Action> {
        match &self.action {
            ActionConfig::Switch => Arc::new(SwitchAction::new(
                self.name.clone(),
                label_index,
                switch_events.clone(),
            )),
            ActionConfig::Log => Arc::new(LogAction::new(self.name.clone())),
            ActionConfig::Command { program, args } => Arc::new(CommandAction::new(
                self.name.clone(),
                program.clone(),
                args.clone(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMelodyConfig")]
pub struct MelodyConfig {
    pub input: PortSelector,
    pub thru: Option<PortSelector>,
    pub max_buffer: usize,
    pub filter: FilterConfig,
    pub patterns: Vec<PatternConfig>,
}

/// On-disk shape, including the platform-style keys.
#[derive(Deserialize)]
struct RawMelodyConfig {
    #[serde(default)]
    input: PortSelector,
    #[serde(default)]
    thru: Option<PortSelector>,
    /// Legacy thru output index.
    #[serde(default)]
    port: Option<usize>,
    #[serde(default = "default_max_buffer")]
    max_buffer: usize,
    #[serde(default)]
    filter: FilterConfig,
    #[serde(alias = "accessories")]
    patterns: Vec<PatternConfig>,
}

impl From<RawMelodyConfig> for MelodyConfig {
    fn from(raw: RawMelodyConfig) -> Self {
        Self {
            input: raw.input,
            thru: raw.thru.or(raw.port.map(PortSelector::Index)),
            max_buffer: raw.max_buffer,
            filter: raw.filter,
            patterns: raw.patterns,
        }
    }
}

fn default_max_buffer() -> usize {
    DEFAULT_MAX_BUFFER
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            input: PortSelector::default(),
            thru: None,
            max_buffer: DEFAULT_MAX_BUFFER,
            filter: FilterConfig::default(),
            patterns: Vec::new(),
        }
    }
}

impl MelodyConfig {
    pub fn new(patterns: Vec<PatternConfig>) -> Self {
        Self {
            patterns,
            ..Self::default()
        }
    }

    /// Parse and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MelodyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_buffer == 0 {
            return Err(ConfigError::InvalidMaxBuffer);
        }
        for pattern in &self.patterns {
            pattern.validate()?;
        }

        let longest = self.longest_pattern();
        if longest > self.max_buffer {
            warn!(
                "max_buffer {} is shorter than the longest pattern ({} notes)",
                self.max_buffer, longest
            );
        }
        if self.patterns.is_empty() {
            warn!("No patterns configured, nothing will ever match");
        }
        Ok(())
    }

    pub fn longest_pattern(&self) -> usize {
        self.patterns
            .iter()
            .map(|p| p.sequence.len())
            .max()
            .unwrap_or(0)
    }

    /// Build the pattern table in configuration order with configured actions.
    pub fn build_patterns(&self, switch_events: &Sender<SwitchEvent>) -> Vec<Pattern> {
        self.patterns
            .iter()
            .enumerate()
            .map(|(index, p)| {
                Pattern::with_action(
                    p.name.clone(),
                    p.sequence.clone(),
                    p.build_action(index + 1, switch_events),
                )
            })
            .collect()
    }
}
