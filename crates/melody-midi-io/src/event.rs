//! Raw MIDI message classification and the note-on filter.

use melody_core::{FilterConfig, Note};

/// Channel voice messages the matcher cares about. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    Other,
}

impl RawMessage {
    pub fn parse(bytes: &[u8]) -> Self {
        let [status, note, velocity, ..] = *bytes else {
            return RawMessage::Other;
        };
        let channel = status & 0x0F;

        match status & 0xF0 {
            0x90 => RawMessage::NoteOn {
                channel,
                note,
                velocity,
            },
            0x80 => RawMessage::NoteOff {
                channel,
                note,
                velocity,
            },
            _ => RawMessage::Other,
        }
    }
}

/// Extracts note numbers from "note on" messages.
///
/// The default accepts only channel 1 (status byte `0x90`) and keeps
/// zero-velocity note-ons, which many controllers send as releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOnFilter {
    /// 0-based channel; `None` accepts every channel.
    pub channel: Option<u8>,
    pub ignore_zero_velocity: bool,
}

impl Default for NoteOnFilter {
    fn default() -> Self {
        FilterConfig::default().into()
    }
}

impl NoteOnFilter {
    pub fn any_channel() -> Self {
        Self {
            channel: None,
            ..Self::default()
        }
    }

    #[inline]
    pub fn note(&self, bytes: &[u8]) -> Option<Note> {
        match RawMessage::parse(bytes) {
            RawMessage::NoteOn {
                channel,
                note,
                velocity,
            } => {
                if self.channel.is_some_and(|c| c != channel) {
                    return None;
                }
                if self.ignore_zero_velocity && velocity == 0 {
                    return None;
                }
                Some(note)
            }
            _ => None,
        }
    }
}

impl From<FilterConfig> for NoteOnFilter {
    fn from(config: FilterConfig) -> Self {
        Self {
            channel: config.channel,
            ignore_zero_velocity: config.ignore_zero_velocity,
        }
    }
}
