//! wiimidi - play a synthesizer by swinging a motion controller

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wiimidi::config;
use wiimidi::engine::{list_midi_ports, JsonLinesTransport, MappingEngine, MidiTransport, MidirTransport, TracingHaptics};
use wiimidi::sources::{ControllerId, FrameSource, Recording, ReplaySource};
use wiimidi::MappingError;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Replay {
            config: config_path,
            input,
            dry_run,
            looping,
        } => {
            let cfg = config::load_config(&config_path)?;
            let recording = Recording::load(&input)?;
            info!(
                frames = recording.frames.len(),
                interval_ms = recording.interval_ms,
                "loaded recording {:?}",
                input
            );

            let mut transport: Box<dyn MidiTransport> = if dry_run {
                Box::new(JsonLinesTransport::new(std::io::stdout()))
            } else {
                Box::new(MidirTransport::connect(
                    cfg.midi.port.as_deref(),
                    &cfg.midi.client_name,
                )?)
            };

            let mut engine = MappingEngine::new(cfg)?.with_haptics(TracingHaptics);
            for id in ControllerId::ALL {
                engine.connect(id);
            }

            let interrupted = Arc::new(AtomicBool::new(false));
            {
                let interrupted = Arc::clone(&interrupted);
                ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))?;
            }

            let rt = tokio::runtime::Runtime::new()?;
            let outcome = rt.block_on(async {
                let mut source = ReplaySource::new(input.display().to_string(), recording)
                    .with_looping(looping);
                let mut rx = source.subscribe();
                source.start()?;

                let idle = Duration::from_millis(50);
                while !interrupted.load(Ordering::SeqCst) {
                    tokio::select! {
                        received = rx.recv() => match received {
                            Ok(tagged) => {
                                match engine.dispatch(tagged.controller, &tagged.frame, transport.as_mut()) {
                                    Ok(_) => {}
                                    Err(e @ MappingError::TransportUnavailable(_)) => return Err(anyhow::Error::from(e)),
                                    Err(e) => warn!("frame dropped: {}", e),
                                }
                            }
                            Err(RecvError::Lagged(skipped)) => warn!(skipped, "replay fell behind"),
                            Err(RecvError::Closed) => break,
                        },
                        _ = tokio::time::sleep(idle) => {
                            if !source.is_running() && rx.is_empty() {
                                break;
                            }
                        }
                    }
                }

                source.stop();
                Ok::<(), anyhow::Error>(())
            });

            if interrupted.load(Ordering::SeqCst) {
                info!("interrupted, releasing notes");
            }
            for event in engine.release_all() {
                if let Err(e) = transport.send(&event) {
                    warn!("could not release notes: {}", e);
                    break;
                }
            }
            for id in ControllerId::ALL {
                engine.disconnect(id);
            }
            outcome?;
            info!("replay finished");
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    let m = &cfg.mapping;
                    println!("Configuration is valid!");
                    println!("  MIDI port: {}", cfg.midi.port.as_deref().unwrap_or("(first available)"));
                    println!("  Dead zones: joystick {}, roll {} deg", m.dead_threshold, m.dead_bend_threshold);
                    println!("  Hits: axis {:?}, limit {}, scale {}", m.hit_axis, m.hit_limit, m.hit_scale);
                    println!("  Pitch modulus: {}", m.pitch_modulus);
                    println!("  Rumble on impact: {}", m.rumble_on_impact);
                    match &m.scale {
                        Some(scale) => println!("  Scale: {}", scale),
                        None if m.scale_table.is_some() => println!("  Scale: custom table"),
                        None => println!("  Scale: compass"),
                    }
                    for id in ControllerId::ALL {
                        let s = cfg.settings_for(id);
                        println!(
                            "    - {}: channel {}, octave {}, modifier {:?}",
                            id, s.channel, s.octave, s.note_modifier
                        );
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Ports => {
            let ports = list_midi_ports()?;
            if ports.is_empty() {
                println!("No MIDI output ports found.");
            } else {
                println!("MIDI output ports:");
                for name in ports {
                    println!("  - {}", name);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../wiimidi.example.yaml");

            let path = "wiimidi.yaml";
            if std::path::Path::new(path).exists() {
                println!("wiimidi.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created wiimidi.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
