//! Two melodies on the first input port: one drives a closure, the other
//! a programmable switch. Plays along with the MIDI thru on output 0.
//!
//! Run with: cargo run --example keyboard_switches

use melody::prelude::*;
use melody::PortSelector;
use std::time::Duration;

fn main() -> melody::Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = MelodyConfig::new(vec![
        // C E G
        PatternConfig::new("Chime", vec![60, 64, 67]),
        // G F E D C
        PatternConfig::new("Porch", vec![67, 65, 64, 62, 60]),
    ]);
    config.thru = Some(PortSelector::Index(0));

    let mut host = MelodyHost::builder()
        .config(config)
        .action("Chime", || println!("*ding*"))
        .build()?;
    host.start()?;

    println!("Play C-E-G or G-F-E-D-C. Stopping after 60 seconds.");
    let deadline = std::time::Instant::now() + Duration::from_secs(60);
    while std::time::Instant::now() < deadline {
        if let Ok(m) = host.matches().recv_timeout(Duration::from_millis(250)) {
            println!("matched {}", m.name);
        }
        for press in host.switch_events().try_iter() {
            println!("switch {} pressed", press.label_index);
        }
    }

    host.stop()?;
    Ok(())
}
