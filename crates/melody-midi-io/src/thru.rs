//! MIDI thru: pass every incoming message on, unchanged.

use crossbeam_channel::{Sender, TrySendError};
use std::sync::Arc;
use tracing::debug;

/// Pass-through sink fed by the matcher worker after each message is matched.
/// Must not block.
pub trait MidiThru: Send {
    fn forward(&self, bytes: &[u8]);
}

impl<T: MidiThru + Sync> MidiThru for Arc<T> {
    #[inline]
    fn forward(&self, bytes: &[u8]) {
        (**self).forward(bytes)
    }
}

/// In-process thru, e.g. to chain another worker.
impl MidiThru for Sender<Vec<u8>> {
    fn forward(&self, bytes: &[u8]) {
        if let Err(TrySendError::Full(_)) = self.try_send(bytes.to_vec()) {
            debug!("MIDI thru channel full, dropping message");
        }
    }
}
