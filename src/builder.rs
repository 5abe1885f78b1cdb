//! Builder for configuring and constructing a `MelodyHost`.

use crate::{MelodyHost, Result};
use melody_core::{Action, MelodyConfig, Pattern, SequenceMatcher, SwitchEvent};
use melody_midi_io::{MatcherWorker, MidiThru};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "midi-hardware")]
use melody_midi_io::MidiOutputManager;

const SWITCH_EVENT_CAPACITY: usize = 256;

/// Actions registered with [`action`](Self::action) replace the configured
/// action of every pattern with that name. Ports are opened only when the
/// host is started.
///
/// # Example
///
/// ```ignore
/// use melody::prelude::*;
///
/// let mut host = MelodyHost::builder()
///     .config(MelodyConfig::load("melody.json")?)
///     .action("Lights", || println!("lights"))
///     .build()?;
/// host.start()?;
/// ```
#[derive(Default)]
pub struct MelodyHostBuilder {
    config: MelodyConfig,
    actions: HashMap<String, Arc<dyn Action>>,
    thru: Option<Box<dyn MidiThru>>,
}

impl MelodyHostBuilder {
    pub fn config(mut self, config: MelodyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn action(mut self, name: impl Into<String>, action: impl Action + 'static) -> Self {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    /// Use a custom thru sink instead of the configured output port.
    pub fn thru(mut self, thru: impl MidiThru + 'static) -> Self {
        self.thru = Some(Box::new(thru));
        self
    }

    pub fn build(self) -> Result<MelodyHost> {
        let MelodyHostBuilder {
            config,
            actions,
            thru,
        } = self;
        config.validate()?;

        let (switch_sender, switch_events) =
            crossbeam_channel::bounded::<SwitchEvent>(SWITCH_EVENT_CAPACITY);

        let patterns: Vec<Pattern> = config
            .patterns
            .iter()
            .enumerate()
            .map(|(index, p)| {
                let action = match actions.get(&p.name) {
                    Some(action) => {
                        debug!("Using injected action for {}", p.name);
                        Arc::clone(action)
                    }
                    None => p.build_action(index + 1, &switch_sender),
                };
                Pattern::with_action(p.name.clone(), p.sequence.clone(), action)
            })
            .collect();

        let matcher = SequenceMatcher::with_max_buffer(patterns, config.max_buffer)?;

        #[cfg(feature = "midi-hardware")]
        let thru_output = match (&thru, &config.thru) {
            (None, Some(_)) => Some(Arc::new(MidiOutputManager::new()?)),
            _ => None,
        };

        #[cfg(feature = "midi-hardware")]
        let thru = thru.or_else(|| {
            thru_output
                .as_ref()
                .map(|out| Box::new(Arc::clone(out)) as Box<dyn MidiThru>)
        });

        let worker = MatcherWorker::spawn(matcher, config.filter.into(), thru)?;

        Ok(MelodyHost::from_parts(
            config,
            worker,
            switch_events,
            #[cfg(feature = "midi-hardware")]
            thru_output,
        ))
    }
}
