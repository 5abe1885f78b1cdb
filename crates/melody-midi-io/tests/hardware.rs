//! Hardware integration tests using a MIDI loopback (macOS IAC Driver, or
//! `snd-virmidi` on Linux).
//!
//! All tests are `#[ignore]` so CI doesn't fail without hardware.
//!
//! Run with:
//!   cargo test -p melody-midi-io --test hardware -- --ignored --test-threads=1

#![cfg(feature = "midi-io")]

use melody_core::{Pattern, SequenceMatcher};
use melody_midi_io::{
    MatcherWorker, MidiInputManager, MidiOutputManager, MidiOutputMessage, NoteOnFilter,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const LOOPBACK_NAME: &str = "IAC";
const SETTLE: Duration = Duration::from_millis(200);
const TIMEOUT: Duration = Duration::from_secs(2);

fn loopback_available() -> bool {
    let _ = tracing_subscriber::fmt::try_init();
    let has_input = MidiInputManager::list_devices()
        .iter()
        .any(|d| d.name.contains(LOOPBACK_NAME));
    let has_output = MidiOutputManager::list_devices()
        .iter()
        .any(|d| d.name.contains(LOOPBACK_NAME));
    has_input && has_output
}

#[test]
#[ignore]
fn test_loopback_melody_triggers() {
    if !loopback_available() {
        eprintln!("Loopback port '{}' not found, skipping", LOOPBACK_NAME);
        return;
    }

    let matcher = SequenceMatcher::new(vec![Pattern::new("A", vec![60, 62, 64], || {})]).unwrap();
    let worker = MatcherWorker::spawn(matcher, NoteOnFilter::default(), None).unwrap();

    let input = MidiInputManager::new().unwrap();
    input
        .connect_by_name(LOOPBACK_NAME, worker.sender())
        .expect("Failed to connect loopback input");
    let output = MidiOutputManager::new().unwrap();
    output
        .connect_by_name(LOOPBACK_NAME)
        .expect("Failed to connect loopback output");
    thread::sleep(SETTLE);

    for note in [60, 62, 64] {
        output.send_message(MidiOutputMessage::note_on(0, note, 100));
        output.send_message(MidiOutputMessage::note_off(0, note, 0));
    }

    let n = worker
        .matches()
        .recv_timeout(TIMEOUT)
        .expect("No match received over loopback");
    assert_eq!(n.name, "A");
}

#[test]
#[ignore]
fn test_loopback_thru_forwarding() {
    if !loopback_available() {
        eprintln!("Loopback port '{}' not found, skipping", LOOPBACK_NAME);
        return;
    }

    let thru = Arc::new(MidiOutputManager::new().unwrap());
    thru.connect_by_name(LOOPBACK_NAME).unwrap();
    assert!(thru.is_connected());

    let matcher = SequenceMatcher::new(vec![Pattern::new("B", vec![64], || {})]).unwrap();
    let worker = MatcherWorker::spawn(
        matcher,
        NoteOnFilter::default(),
        Some(Box::new(Arc::clone(&thru))),
    )
    .unwrap();

    assert!(worker.push(&[0x90, 64, 100]));
    let n = worker.matches().recv_timeout(TIMEOUT).unwrap();
    assert_eq!(n.name, "B");

    thru.disconnect();
    thread::sleep(SETTLE);
    assert!(!thru.is_connected());
}
