//! Matcher worker: a dedicated thread that owns one `SequenceMatcher`.
//!
//! All producers (the midir callback, programmatic pushes) share one bounded
//! channel, so messages reach the matcher strictly in arrival order and each
//! one is fully processed, action included, before the next is read.

use crate::error::{Error, Result};
use crate::event::NoteOnFilter;
use crate::thru::MidiThru;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use melody_core::{MatchOutcome, Note, SequenceMatcher};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

const MESSAGE_QUEUE_CAPACITY: usize = 1024;
const MATCH_QUEUE_CAPACITY: usize = 256;

/// Published by the worker after every `Matched` outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchNotification {
    pub pattern_index: usize,
    pub name: String,
    /// The note that completed the pattern.
    pub note: Note,
}

enum WorkerCommand {
    Message(Vec<u8>),
    Reset,
    Shutdown,
}

/// Cloneable, non-blocking producer side of a worker's queue.
#[derive(Clone)]
pub struct MessageSender {
    sender: Sender<WorkerCommand>,
}

impl MessageSender {
    /// Queue one raw message. Returns false if the queue is full or the
    /// worker has stopped; the message is dropped in that case.
    pub fn push(&self, bytes: &[u8]) -> bool {
        match self.sender.try_send(WorkerCommand::Message(bytes.to_vec())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Matcher queue full, MIDI message dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Matcher worker stopped, MIDI message dropped");
                false
            }
        }
    }
}

impl std::fmt::Debug for MessageSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSender")
            .field("queued", &self.sender.len())
            .finish()
    }
}

pub struct MatcherWorker {
    sender: MessageSender,
    matches: Receiver<MatchNotification>,
    thread: Option<JoinHandle<SequenceMatcher>>,
}

impl MatcherWorker {
    pub fn spawn(
        matcher: SequenceMatcher,
        filter: NoteOnFilter,
        thru: Option<Box<dyn MidiThru>>,
    ) -> Result<Self> {
        let (command_sender, command_receiver) = bounded(MESSAGE_QUEUE_CAPACITY);
        let (match_sender, matches) = bounded(MATCH_QUEUE_CAPACITY);

        let thread = thread::Builder::new()
            .name("melody-matcher".to_string())
            .spawn(move || {
                Self::worker_thread(matcher, filter, thru, command_receiver, match_sender)
            })?;

        Ok(Self {
            sender: MessageSender {
                sender: command_sender,
            },
            matches,
            thread: Some(thread),
        })
    }

    fn worker_thread(
        mut matcher: SequenceMatcher,
        filter: NoteOnFilter,
        thru: Option<Box<dyn MidiThru>>,
        command_receiver: Receiver<WorkerCommand>,
        match_sender: Sender<MatchNotification>,
    ) -> SequenceMatcher {
        debug!("Matcher worker started with {} patterns", matcher.patterns().len());

        while let Ok(command) = command_receiver.recv() {
            match command {
                WorkerCommand::Message(bytes) => {
                    debug!("m: {:?}", bytes);
                    if let Some(note) = filter.note(&bytes) {
                        Self::dispatch(&mut matcher, note, &match_sender);
                    }
                    if let Some(thru) = &thru {
                        thru.forward(&bytes);
                    }
                }
                WorkerCommand::Reset => matcher.reset(),
                WorkerCommand::Shutdown => break,
            }
        }

        debug!("Matcher worker stopped");
        matcher
    }

    fn dispatch(matcher: &mut SequenceMatcher, note: Note, match_sender: &Sender<MatchNotification>) {
        let MatchOutcome::Matched(pattern_index) = matcher.on_event(note) else {
            return;
        };
        let name = matcher
            .pattern(pattern_index)
            .map(|p| p.name().to_string())
            .unwrap_or_default();

        let notification = MatchNotification {
            pattern_index,
            name,
            note,
        };
        if let Err(TrySendError::Full(n)) = match_sender.try_send(notification) {
            debug!("Match queue full, dropping notification for {}", n.name);
        }
    }

    /// Producer handle for the midir callback or other threads.
    pub fn sender(&self) -> MessageSender {
        self.sender.clone()
    }

    pub fn push(&self, bytes: &[u8]) -> bool {
        self.sender.push(bytes)
    }

    /// Clear the matcher's history, in order with queued messages.
    pub fn reset(&self) -> Result<()> {
        self.sender
            .sender
            .send(WorkerCommand::Reset)
            .map_err(|_| Error::ThreadStopped("Matcher"))
    }

    pub fn matches(&self) -> &Receiver<MatchNotification> {
        &self.matches
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Drain queued messages, stop the thread, and hand back the matcher.
    pub fn shutdown(mut self) -> Result<SequenceMatcher> {
        self.stop().ok_or(Error::ThreadStopped("Matcher"))
    }

    fn stop(&mut self) -> Option<SequenceMatcher> {
        let thread = self.thread.take()?;
        let _ = self.sender.sender.send(WorkerCommand::Shutdown);
        match thread.join() {
            Ok(matcher) => Some(matcher),
            Err(_) => {
                warn!("Matcher worker panicked");
                None
            }
        }
    }
}

impl Drop for MatcherWorker {
    fn drop(&mut self) {
        if self.stop().is_some() {
            info!("Matcher worker shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use melody_core::Pattern;
    use std::time::Duration;

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn ab_worker(thru: Option<Box<dyn MidiThru>>) -> MatcherWorker {
        let matcher = SequenceMatcher::new(vec![
            Pattern::new("A", vec![60, 62, 64], || {}),
            Pattern::new("B", vec![64], || {}),
        ])
        .unwrap();
        MatcherWorker::spawn(matcher, NoteOnFilter::default(), thru).unwrap()
    }

    #[test]
    fn test_worker_publishes_match() {
        let worker = ab_worker(None);
        assert!(worker.push(&[0x90, 60, 100]));
        assert!(worker.push(&[0x90, 62, 100]));
        assert!(worker.push(&[0x90, 64, 100]));

        let n = worker.matches().recv_timeout(TIMEOUT).unwrap();
        assert_eq!(n.pattern_index, 0);
        assert_eq!(n.name, "A");
        assert_eq!(n.note, 64);
    }

    #[test]
    fn test_worker_ignores_non_note_on() {
        let worker = ab_worker(None);
        worker.push(&[0x80, 64, 0]);
        worker.push(&[0xB0, 64, 127]);
        worker.push(&[0x91, 64, 100]);

        let matcher = worker.shutdown().unwrap();
        assert!(matcher.buffer().is_empty());
    }

    #[test]
    fn test_worker_forwards_every_message() {
        let (tx, rx) = bounded::<Vec<u8>>(16);
        let worker = ab_worker(Some(Box::new(tx)));
        worker.push(&[0x90, 64, 100]);
        worker.push(&[0xB0, 7, 127]);
        drop(worker);

        let forwarded: Vec<_> = rx.try_iter().collect();
        assert_eq!(forwarded, vec![vec![0x90, 64, 100], vec![0xB0, 7, 127]]);
    }

    #[test]
    fn test_reset_is_ordered_with_messages() {
        let worker = ab_worker(None);
        worker.push(&[0x90, 60, 100]);
        worker.push(&[0x90, 62, 100]);
        worker.reset().unwrap();
        worker.push(&[0x90, 70, 100]);

        let matcher = worker.shutdown().unwrap();
        assert_eq!(matcher.buffer(), &[70]);
    }

    #[test]
    fn test_shutdown_returns_matcher_state() {
        let worker = ab_worker(None);
        assert!(worker.is_running());
        worker.push(&[0x90, 1, 100]);
        worker.push(&[0x90, 2, 100]);
        let matcher = worker.shutdown().unwrap();
        assert_eq!(matcher.buffer(), &[1, 2]);
    }

    #[test]
    fn test_panicking_action_stops_worker() {
        let matcher = SequenceMatcher::new(vec![Pattern::new("boom", vec![1], || {
            panic!("action failed");
        })])
        .unwrap();
        let worker = MatcherWorker::spawn(matcher, NoteOnFilter::default(), None).unwrap();
        let sender = worker.sender();
        assert!(sender.push(&[0x90, 1, 100]));

        let deadline = std::time::Instant::now() + TIMEOUT;
        while worker.is_running() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!worker.is_running());
        assert!(!sender.push(&[0x90, 2, 100]));
        assert!(worker.shutdown().is_err());
    }

    #[test]
    fn test_sender_outlives_worker() {
        let worker = ab_worker(None);
        let sender = worker.sender();
        drop(worker);
        assert!(!sender.push(&[0x90, 60, 100]));
    }
}
