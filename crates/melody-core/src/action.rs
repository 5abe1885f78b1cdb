//! Action sinks invoked when a pattern is recognized.
//!
//! `trigger()` runs synchronously on the matcher's thread, so implementations
//! must return quickly and must not call back into the matcher. Dispatch is
//! fire-and-forget: failures are logged here and never reach the matcher.

use crossbeam_channel::{Sender, TrySendError};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Capability injected into a [`Pattern`](crate::Pattern) at construction.
pub trait Action: Send + Sync {
    fn trigger(&self);
}

impl<F> Action for F
where
    F: Fn() + Send + Sync,
{
    #[inline]
    fn trigger(&self) {
        self()
    }
}

/// Logs the trigger and does nothing else.
#[derive(Debug, Clone)]
pub struct LogAction {
    name: String,
}

impl LogAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Action for LogAction {
    fn trigger(&self) {
        info!(pattern = %self.name, "Trigger single press");
    }
}

/// Spawns an external program without waiting for it.
#[derive(Debug, Clone)]
pub struct CommandAction {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandAction {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Action for CommandAction {
    fn trigger(&self) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                debug!(pattern = %self.name, pid = child.id(), "Spawned {}", self.program);
                // Reaped off-thread.
                let reaper = std::thread::Builder::new()
                    .name("melody-command-reaper".to_string())
                    .spawn(move || {
                        let _ = child.wait();
                    });
                if let Err(e) = reaper {
                    warn!(pattern = %self.name, "Failed to spawn reaper thread: {}", e);
                }
            }
            Err(e) => {
                warn!(pattern = %self.name, "Failed to spawn {}: {}", self.program, e);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchEventKind {
    SinglePress,
}

/// Event emitted by a [`SwitchAction`]; mirrors a stateless programmable
/// switch that only ever reports single presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchEvent {
    pub name: String,
    /// 1-based position of the pattern in the table.
    pub label_index: usize,
    pub kind: SwitchEventKind,
}

/// Stateless programmable switch. Each trigger emits one [`SwitchEvent`].
#[derive(Debug, Clone)]
pub struct SwitchAction {
    name: String,
    label_index: usize,
    events: Sender<SwitchEvent>,
}

impl SwitchAction {
    pub fn new(name: impl Into<String>, label_index: usize, events: Sender<SwitchEvent>) -> Self {
        Self {
            name: name.into(),
            label_index,
            events,
        }
    }

    pub fn label_index(&self) -> usize {
        self.label_index
    }
}

impl Action for SwitchAction {
    fn trigger(&self) {
        let event = SwitchEvent {
            name: self.name.clone(),
            label_index: self.label_index,
            kind: SwitchEventKind::SinglePress,
        };
        match self.events.try_send(event) {
            Ok(()) => debug!(pattern = %self.name, "Switch single press"),
            Err(TrySendError::Full(_)) => {
                warn!(pattern = %self.name, "Switch event channel full, press dropped")
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(pattern = %self.name, "No switch listener, press dropped")
            }
        }
    }
}
