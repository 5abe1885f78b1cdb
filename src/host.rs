//! Melody host: one matcher worker plus its input and thru devices.

use crate::{MelodyHostBuilder, Result};
use crossbeam_channel::Receiver;
use melody_core::{MelodyConfig, SequenceMatcher, SwitchEvent};
use melody_midi_io::{MatchNotification, MatcherWorker};

#[cfg(feature = "midi-hardware")]
use melody_core::PortSelector;
#[cfg(feature = "midi-hardware")]
use melody_midi_io::{MidiInputManager, MidiOutputManager};
#[cfg(feature = "midi-hardware")]
use std::sync::Arc;
#[cfg(feature = "midi-hardware")]
use tracing::info;

/// Owns the matcher worker for a single input stream.
///
/// Nothing reaches the matcher until either [`start`](Self::start) connects
/// the input device or messages are fed through
/// [`push_message`](Self::push_message).
pub struct MelodyHost {
    config: MelodyConfig,
    worker: MatcherWorker,
    switch_events: Receiver<SwitchEvent>,
    #[cfg(feature = "midi-hardware")]
    input: Option<MidiInputManager>,
    #[cfg(feature = "midi-hardware")]
    thru: Option<Arc<MidiOutputManager>>,
}

impl std::fmt::Debug for MelodyHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MelodyHost")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MelodyHost {
    pub fn builder() -> MelodyHostBuilder {
        MelodyHostBuilder::default()
    }

    pub(crate) fn from_parts(
        config: MelodyConfig,
        worker: MatcherWorker,
        switch_events: Receiver<SwitchEvent>,
        #[cfg(feature = "midi-hardware")] thru: Option<Arc<MidiOutputManager>>,
    ) -> Self {
        Self {
            config,
            worker,
            switch_events,
            #[cfg(feature = "midi-hardware")]
            input: None,
            #[cfg(feature = "midi-hardware")]
            thru,
        }
    }

    /// Connect the configured input port, and the thru output if one is
    /// configured.
    #[cfg(feature = "midi-hardware")]
    pub fn start(&mut self) -> Result<()> {
        for device in MidiInputManager::list_devices() {
            info!("Available MIDI input [{}] {}", device.index, device.name);
        }

        if let (Some(thru), Some(selector)) = (&self.thru, &self.config.thru) {
            for device in MidiOutputManager::list_devices() {
                info!("Available MIDI output [{}] {}", device.index, device.name);
            }
            match selector {
                PortSelector::Index(index) => thru.connect(*index)?,
                PortSelector::Name(name) => thru.connect_by_name(name)?,
            };
        }

        let input = match self.input.take() {
            Some(input) => input,
            None => MidiInputManager::new()?,
        };
        let sender = self.worker.sender();
        let connected = match &self.config.input {
            PortSelector::Index(index) => input.connect(*index, sender),
            PortSelector::Name(name) => input.connect_by_name(name, sender),
        };
        self.input = Some(input);
        connected?;
        Ok(())
    }

    /// Disconnect hardware; the worker keeps running.
    #[cfg(feature = "midi-hardware")]
    pub fn disconnect(&self) {
        if let Some(input) = &self.input {
            input.disconnect();
        }
        if let Some(thru) = &self.thru {
            thru.disconnect();
        }
    }

    #[cfg(feature = "midi-hardware")]
    pub fn input_device_name(&self) -> Option<String> {
        self.input.as_ref().and_then(|i| i.connected_device_name())
    }

    #[cfg(feature = "midi-hardware")]
    pub fn thru_device_name(&self) -> Option<String> {
        self.thru.as_ref().and_then(|t| t.connected_device_name())
    }

    /// Feed one raw MIDI message as if it came from the input device.
    pub fn push_message(&self, bytes: &[u8]) -> bool {
        self.worker.push(bytes)
    }

    /// Forget the note history.
    pub fn reset(&self) -> Result<()> {
        Ok(self.worker.reset()?)
    }

    pub fn matches(&self) -> &Receiver<MatchNotification> {
        self.worker.matches()
    }

    /// Presses published by switch actions.
    pub fn switch_events(&self) -> &Receiver<SwitchEvent> {
        &self.switch_events
    }

    pub fn config(&self) -> &MelodyConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_running()
    }

    /// Disconnect devices, drain queued messages, and stop the worker.
    pub fn stop(self) -> Result<SequenceMatcher> {
        #[cfg(feature = "midi-hardware")]
        self.disconnect();
        Ok(self.worker.shutdown()?)
    }
}
