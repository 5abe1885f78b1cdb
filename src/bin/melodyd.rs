//! Melody daemon. Loads a JSON config, connects the configured ports, and
//! logs every recognized melody until killed.
//!
//! Usage: `melodyd <config.json>` or `melodyd --list`

use std::env;
use std::process::ExitCode;

use melody::midi::{MidiInputManager, MidiOutputManager};
use melody::{MelodyConfig, MelodyHost, Result};
use tracing::{error, info};

fn list_ports() {
    println!("MIDI inputs:");
    for device in MidiInputManager::list_devices() {
        println!("  [{}] {}", device.index, device.name);
    }
    println!("MIDI outputs:");
    for device in MidiOutputManager::list_devices() {
        println!("  [{}] {}", device.index, device.name);
    }
}

fn run(config_path: &str) -> Result<()> {
    let config = MelodyConfig::load(config_path)?;
    info!(
        "Loaded {} patterns from {}",
        config.patterns.len(),
        config_path
    );

    let mut host = MelodyHost::builder().config(config).build()?;
    host.start()?;
    if let Some(name) = host.input_device_name() {
        info!("Listening on {}", name);
    }

    let switch_events = host.switch_events().clone();
    for m in host.matches().iter() {
        info!("Matched {} (pattern {}, note {})", m.name, m.pattern_index, m.note);
        for press in switch_events.try_iter() {
            info!("Switch {} [{}] {:?}", press.name, press.label_index, press.kind);
        }
    }

    host.stop()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let Some(arg) = env::args().nth(1) else {
        eprintln!("usage: melodyd <config.json> | --list");
        return ExitCode::from(2);
    };

    if arg == "--list" {
        list_ports();
        return ExitCode::SUCCESS;
    }

    match run(&arg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
