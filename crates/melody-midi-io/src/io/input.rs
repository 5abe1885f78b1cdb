//! MIDI input: device enumeration and connection.
//!
//! The midir connection lives on a dedicated thread for platform
//! thread-safety. Its callback only copies the raw bytes into a matcher
//! worker's queue.

use crate::error::{Error, Result};
use crate::worker::MessageSender;
use arc_swap::ArcSwap;
use crossbeam_channel::{bounded, Receiver, Sender};
use midir::{MidiInput, MidiInputConnection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct MidiInputDevice {
    pub index: usize,
    pub name: String,
}

enum MidiInputCommand {
    Connect(usize, MessageSender, Sender<Result<String>>),
    Disconnect,
    Shutdown,
}

pub struct MidiInputManager {
    command_sender: Sender<MidiInputCommand>,
    connected_device: Arc<ArcSwap<Option<String>>>,
    is_connected: Arc<AtomicBool>,
}

impl MidiInputManager {
    pub fn new() -> Result<Self> {
        let (command_sender, command_receiver) = bounded(16);
        let connected_device = Arc::new(ArcSwap::new(Arc::new(None)));
        let is_connected = Arc::new(AtomicBool::new(false));

        let connected_device_clone = Arc::clone(&connected_device);
        let is_connected_clone = Arc::clone(&is_connected);

        thread::Builder::new()
            .name("midi-input-thread".to_string())
            .spawn(move || {
                Self::midi_input_thread(
                    command_receiver,
                    connected_device_clone,
                    is_connected_clone,
                );
            })?;

        Ok(Self {
            command_sender,
            connected_device,
            is_connected,
        })
    }

    fn midi_input_thread(
        command_receiver: Receiver<MidiInputCommand>,
        connected_device: Arc<ArcSwap<Option<String>>>,
        is_connected: Arc<AtomicBool>,
    ) {
        let mut connection: Option<MidiInputConnection<()>> = None;

        let drop_connection = |connection: &mut Option<MidiInputConnection<()>>| {
            if let Some(conn) = connection.take() {
                let _ = conn.close();
                is_connected.store(false, Ordering::SeqCst);
                connected_device.store(Arc::new(None));
            }
        };

        while let Ok(command) = command_receiver.recv() {
            match command {
                MidiInputCommand::Connect(device_index, sender, reply) => {
                    drop_connection(&mut connection);

                    let result = match Self::connect_to_device(device_index, sender) {
                        Ok((conn, name)) => {
                            connection = Some(conn);
                            is_connected.store(true, Ordering::SeqCst);
                            connected_device.store(Arc::new(Some(name.clone())));
                            info!("Connected to MIDI input: {}", name);
                            Ok(name)
                        }
                        Err(e) => {
                            warn!("MIDI input connection failed: {}", e);
                            Err(e)
                        }
                    };
                    let _ = reply.send(result);
                }
                MidiInputCommand::Disconnect => drop_connection(&mut connection),
                MidiInputCommand::Shutdown => {
                    drop_connection(&mut connection);
                    break;
                }
            }
        }
    }

    fn connect_to_device(
        device_index: usize,
        sender: MessageSender,
    ) -> Result<(MidiInputConnection<()>, String)> {
        let midi_input = MidiInput::new("melody-midi-input")?;

        let ports = midi_input.ports();
        let port = ports.get(device_index).ok_or_else(|| {
            Error::MidiDevice(format!("MIDI input device {} not found", device_index))
        })?;

        let port_name = midi_input
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", device_index));

        let connection = midi_input.connect(
            port,
            "melody-input",
            move |timestamp, message, _| {
                debug!("m: {:?} d: {}", message, timestamp);
                if !sender.push(message) {
                    debug!("MIDI input dropped: matcher not accepting messages");
                }
            },
            (),
        )?;

        Ok((connection, port_name))
    }

    pub fn list_devices() -> Vec<MidiInputDevice> {
        let mut devices = Vec::new();
        if let Ok(midi_input) = MidiInput::new("melody-device-list") {
            let ports = midi_input.ports();
            for (index, port) in ports.iter().enumerate() {
                let name = midi_input
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                devices.push(MidiInputDevice { index, name });
            }
        }
        devices
    }

    /// Connect device `device_index`, replacing any current connection.
    /// Blocks until the input thread reports the result.
    pub fn connect(&self, device_index: usize, sender: MessageSender) -> Result<String> {
        let (reply_sender, reply) = bounded(1);
        self.command_sender
            .send(MidiInputCommand::Connect(device_index, sender, reply_sender))
            .map_err(|_| Error::ThreadStopped("MIDI input"))?;
        reply
            .recv()
            .map_err(|_| Error::ThreadStopped("MIDI input"))?
    }

    /// Case-insensitive partial match on the device name.
    pub fn connect_by_name(&self, name: &str, sender: MessageSender) -> Result<String> {
        let devices = Self::list_devices();
        let device = devices
            .iter()
            .find(|d| d.name.to_lowercase().contains(&name.to_lowercase()))
            .ok_or_else(|| {
                Error::MidiDevice(format!("No MIDI input device found matching '{}'", name))
            })?;
        self.connect(device.index, sender)
    }

    pub fn disconnect(&self) {
        let _ = self.command_sender.send(MidiInputCommand::Disconnect);
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    pub fn connected_device_name(&self) -> Option<String> {
        self.connected_device.load().as_ref().clone()
    }
}

impl Drop for MidiInputManager {
    fn drop(&mut self) {
        let _ = self.command_sender.send(MidiInputCommand::Shutdown);
    }
}
