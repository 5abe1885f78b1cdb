//! MIDI output: device enumeration, connection, and thru sending via a dedicated thread.

use crate::error::{Error, Result};
use crate::thru::MidiThru;
use arc_swap::ArcSwap;
use crossbeam_channel::{bounded, Receiver, Sender};
use midir::{MidiOutput, MidiOutputConnection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputMessage {
    pub bytes: Vec<u8>,
}

impl MidiOutputMessage {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: vec![0x90 | channel, note & 0x7F, velocity & 0x7F],
        }
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: vec![0x80 | channel, note & 0x7F, velocity & 0x7F],
        }
    }
}

#[derive(Debug, Clone)]
pub struct MidiOutputDevice {
    pub index: usize,
    pub name: String,
}

enum MidiOutputCommand {
    Connect(usize, Sender<Result<String>>),
    Disconnect,
    SendMessage(MidiOutputMessage),
    Shutdown,
}

/// Thru output. Share it with a matcher worker through an `Arc`.
pub struct MidiOutputManager {
    command_sender: Sender<MidiOutputCommand>,
    connected_device: Arc<ArcSwap<Option<String>>>,
    is_connected: Arc<AtomicBool>,
}

impl MidiOutputManager {
    pub fn new() -> Result<Self> {
        let (command_sender, command_receiver) = bounded(1024);
        let connected_device = Arc::new(ArcSwap::new(Arc::new(None)));
        let is_connected = Arc::new(AtomicBool::new(false));

        let connected_device_clone = Arc::clone(&connected_device);
        let is_connected_clone = Arc::clone(&is_connected);

        thread::Builder::new()
            .name("midi-output-thread".to_string())
            .spawn(move || {
                Self::midi_output_thread(
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

    fn midi_output_thread(
        command_receiver: Receiver<MidiOutputCommand>,
        connected_device: Arc<ArcSwap<Option<String>>>,
        is_connected: Arc<AtomicBool>,
    ) {
        let mut connection: Option<MidiOutputConnection> = None;

        while let Ok(command) = command_receiver.recv() {
            match command {
                MidiOutputCommand::Connect(device_index, reply) => {
                    if let Some(conn) = connection.take() {
                        conn.close();
                    }

                    let result = match Self::connect_to_device(device_index) {
                        Ok((conn, name)) => {
                            connection = Some(conn);
                            is_connected.store(true, Ordering::SeqCst);
                            connected_device.store(Arc::new(Some(name.clone())));
                            info!("Connected to MIDI thru output: {}", name);
                            Ok(name)
                        }
                        Err(e) => {
                            is_connected.store(false, Ordering::SeqCst);
                            connected_device.store(Arc::new(None));
                            warn!("MIDI output connection failed: {}", e);
                            Err(e)
                        }
                    };
                    let _ = reply.send(result);
                }
                MidiOutputCommand::Disconnect => {
                    if let Some(conn) = connection.take() {
                        conn.close();
                        is_connected.store(false, Ordering::SeqCst);
                        connected_device.store(Arc::new(None));
                    }
                }
                MidiOutputCommand::SendMessage(msg) => {
                    if let Some(ref mut conn) = connection {
                        if let Err(e) = conn.send(&msg.bytes) {
                            debug!("MIDI output send failed: {}", e);
                        }
                    }
                }
                MidiOutputCommand::Shutdown => {
                    if let Some(conn) = connection.take() {
                        conn.close();
                    }
                    break;
                }
            }
        }
    }

    fn connect_to_device(device_index: usize) -> Result<(MidiOutputConnection, String)> {
        let midi_output = MidiOutput::new("melody-midi-output")?;

        let ports = midi_output.ports();
        let port = ports.get(device_index).ok_or_else(|| {
            Error::MidiDevice(format!("MIDI output device {} not found", device_index))
        })?;

        let port_name = midi_output
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", device_index));

        let connection = midi_output.connect(port, "melody-thru")?;

        Ok((connection, port_name))
    }

    pub fn list_devices() -> Vec<MidiOutputDevice> {
        let mut devices = Vec::new();
        if let Ok(midi_output) = MidiOutput::new("melody-device-list") {
            let ports = midi_output.ports();
            for (index, port) in ports.iter().enumerate() {
                let name = midi_output
                    .port_name(port)
                    .unwrap_or_else(|_| format!("Unknown Device {}", index));
                devices.push(MidiOutputDevice { index, name });
            }
        }
        devices
    }

    pub fn connect(&self, device_index: usize) -> Result<String> {
        let (reply_sender, reply) = bounded(1);
        self.command_sender
            .send(MidiOutputCommand::Connect(device_index, reply_sender))
            .map_err(|_| Error::ThreadStopped("MIDI output"))?;
        reply
            .recv()
            .map_err(|_| Error::ThreadStopped("MIDI output"))?
    }

    pub fn connect_by_name(&self, name: &str) -> Result<String> {
        let devices = Self::list_devices();
        let device = devices
            .iter()
            .find(|d| d.name.to_lowercase().contains(&name.to_lowercase()))
            .ok_or_else(|| {
                Error::MidiDevice(format!("No MIDI output device found matching '{}'", name))
            })?;
        self.connect(device.index)
    }

    pub fn disconnect(&self) {
        let _ = self.command_sender.send(MidiOutputCommand::Disconnect);
    }

    /// Never blocks; drops the message if the output queue is full.
    pub fn send_message(&self, message: MidiOutputMessage) {
        if let Err(e) = self
            .command_sender
            .try_send(MidiOutputCommand::SendMessage(message))
        {
            debug!("MIDI output command channel full or disconnected: {}", e);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::SeqCst)
    }

    pub fn connected_device_name(&self) -> Option<String> {
        self.connected_device.load().as_ref().clone()
    }
}

impl MidiThru for MidiOutputManager {
    fn forward(&self, bytes: &[u8]) {
        if self.is_connected() {
            self.send_message(MidiOutputMessage::from_bytes(bytes));
        }
    }
}

impl Drop for MidiOutputManager {
    fn drop(&mut self) {
        let _ = self.command_sender.send(MidiOutputCommand::Shutdown);
    }
}
