//! Host integration tests driven through `push_message`, no hardware needed.
//!
//! Run with:
//! ```bash
//! cargo test -p melody --test host_integration
//! ```

use melody::prelude::*;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(2);

fn note_on(host: &MelodyHost, note: u8) {
    assert!(host.push_message(&[0x90, note, 100]));
}

/// Build a host from config JSON written to a temp file.
fn host_from_file(json: &str) -> MelodyHost {
    let mut file = tempfile::NamedTempFile::new().expect("temp config");
    file.write_all(json.as_bytes()).unwrap();
    let config = MelodyConfig::load(file.path()).expect("valid config");
    MelodyHost::builder()
        .config(config)
        .build()
        .expect("Failed to build test host")
}

#[test]
fn test_platform_config_drives_switches() {
    let host = host_from_file(
        r#"{
            "platform": "MelodyPlatform",
            "accessories": [
                { "name": "Lamp", "sequence": [60, 62, 64] },
                { "name": "Fan", "sequence": [64] }
            ]
        }"#,
    );

    for note in [60, 62, 64] {
        note_on(&host, note);
    }
    let m = host.matches().recv_timeout(TIMEOUT).unwrap();
    assert_eq!(m.name, "Lamp");
    assert_eq!(m.pattern_index, 0);

    // Buffer was cleared, so a lone 64 now fires the second pattern.
    note_on(&host, 64);
    let m = host.matches().recv_timeout(TIMEOUT).unwrap();
    assert_eq!(m.name, "Fan");

    let presses: Vec<_> = host.switch_events().try_iter().collect();
    assert_eq!(presses.len(), 2);
    assert_eq!(presses[0].label_index, 1);
    assert_eq!(presses[1].label_index, 2);
    assert_eq!(presses[1].kind, SwitchEventKind::SinglePress);
}

#[test]
fn test_noise_between_notes_is_ignored() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let host = MelodyHost::builder()
        .config(MelodyConfig::new(vec![PatternConfig::new("Door", vec![1, 2])]))
        .action("Door", move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap();

    note_on(&host, 1);
    host.push_message(&[0x80, 1, 0]);
    host.push_message(&[0xB0, 64, 127]);
    host.push_message(&[0x91, 9, 100]);
    host.push_message(&[0xF8]);
    note_on(&host, 2);

    let matcher = host.stop().unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(matcher.buffer().is_empty());
}

#[test]
fn test_any_channel_filter_from_config() {
    let host = host_from_file(
        r#"{
            "filter": { "channel": null, "ignore_zero_velocity": true },
            "patterns": [{ "name": "A", "sequence": [5, 6], "action": { "type": "log" } }]
        }"#,
    );

    host.push_message(&[0x93, 5, 80]);
    host.push_message(&[0x9F, 7, 0]);
    host.push_message(&[0x9A, 6, 80]);

    let m = host.matches().recv_timeout(TIMEOUT).unwrap();
    assert_eq!(m.name, "A");
    assert!(host.switch_events().try_recv().is_err());
}

#[test]
fn test_history_bounded_by_config() {
    let host = host_from_file(
        r#"{ "max_buffer": 4, "patterns": [{ "name": "Long", "sequence": [1, 2, 3, 4, 5, 6] }] }"#,
    );

    for note in 10..30 {
        note_on(&host, note);
    }
    let matcher = host.stop().unwrap();
    assert_eq!(matcher.max_buffer(), 6);
    assert_eq!(matcher.buffer(), &[24, 25, 26, 27, 28, 29]);
}

#[test]
fn test_invalid_config_file_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{ "patterns": [{ "name": "A", "sequence": [300] }] }"#)
        .unwrap();
    let err = MelodyConfig::load(file.path()).unwrap_err();
    let err: melody::Error = err.into();
    assert!(matches!(err, melody::Error::Config(_)));
}
