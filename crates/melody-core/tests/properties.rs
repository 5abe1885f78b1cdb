//! Property and end-to-end tests for the melody core.
//!
//! Run with:
//!   cargo test -p melody-core --test properties

use melody_core::{
    MatchOutcome, MelodyConfig, Note, Pattern, SequenceMatcher, SwitchEventKind,
    DEFAULT_MAX_BUFFER,
};
use proptest::prelude::*;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn silent(name: &str, sequence: Vec<Note>) -> Pattern {
    Pattern::new(name, sequence, || {})
}

proptest! {
    /// A single pattern fires iff the buffer (as it stands after the append)
    /// ends with the pattern.
    #[test]
    fn suffix_exactness(
        sequence in prop::collection::vec(0u8..4, 1..5),
        events in prop::collection::vec(0u8..4, 0..200),
    ) {
        let mut matcher = SequenceMatcher::new(vec![silent("P", sequence.clone())]).unwrap();
        let mut shadow: Vec<Note> = Vec::new();

        for note in events {
            shadow.push(note);
            let expected = shadow.ends_with(&sequence);
            let outcome = matcher.on_event(note);

            prop_assert_eq!(outcome.is_match(), expected);
            if expected {
                shadow.clear();
            } else if shadow.len() > DEFAULT_MAX_BUFFER {
                let excess = shadow.len() - DEFAULT_MAX_BUFFER;
                shadow.drain(..excess);
            }
            prop_assert_eq!(matcher.buffer(), shadow.as_slice());
        }
    }

    /// After any outcome the buffer is empty (match) or within bound (no match).
    #[test]
    fn bounded_growth(
        max_buffer in 1usize..16,
        events in prop::collection::vec(any::<u8>(), 0..300),
    ) {
        let patterns = vec![silent("A", vec![10, 20, 30]), silent("B", vec![40])];
        let mut matcher = SequenceMatcher::with_max_buffer(patterns, max_buffer).unwrap();
        let bound = matcher.max_buffer();

        for note in events {
            match matcher.on_event(note) {
                MatchOutcome::Matched(_) => prop_assert!(matcher.buffer().is_empty()),
                MatchOutcome::NoMatch => prop_assert!(matcher.buffer().len() <= bound),
            }
        }
    }

    /// The first listed pattern wins whenever several match the same tail.
    #[test]
    fn first_match_wins(prefix in prop::collection::vec(50u8..60, 0..10)) {
        let patterns = vec![silent("long", vec![1, 2, 3]), silent("short", vec![3])];
        let mut matcher = SequenceMatcher::new(patterns).unwrap();
        for note in prefix {
            matcher.on_event(note);
        }
        matcher.on_event(1);
        matcher.on_event(2);
        prop_assert_eq!(matcher.on_event(3), MatchOutcome::Matched(0));
    }
}

#[test]
fn test_config_file_to_matcher() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "max_buffer": 64,
            "accessories": [
                {{ "name": "A", "sequence": [60, 62, 64] }},
                {{ "name": "B", "sequence": [64] }}
            ]
        }}"#
    )
    .unwrap();

    let config = MelodyConfig::load(file.path()).unwrap();
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut matcher =
        SequenceMatcher::with_max_buffer(config.build_patterns(&tx), config.max_buffer).unwrap();

    for note in [60, 62, 64, 60, 64] {
        matcher.on_event(note);
    }

    let presses: Vec<_> = rx.try_iter().collect();
    assert_eq!(presses.len(), 2);
    assert_eq!(presses[0].name, "A");
    assert_eq!(presses[0].label_index, 1);
    assert_eq!(presses[1].name, "B");
    assert_eq!(presses[1].label_index, 2);
    assert!(presses.iter().all(|p| p.kind == SwitchEventKind::SinglePress));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MelodyConfig::load(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, melody_core::ConfigError::Io(_)));
}

#[test]
fn test_action_fires_once_per_match() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&count);
    let pattern = Pattern::new("Door", vec![36, 36, 38], move || {
        c.fetch_add(1, Ordering::SeqCst);
    });
    let mut matcher = SequenceMatcher::new(vec![pattern]).unwrap();

    // 36 36 36 38: tail is 36 36 38, fires once
    for note in [36, 36, 36, 38] {
        matcher.on_event(note);
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // A lone 38 after the clear is not enough
    matcher.on_event(38);
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
