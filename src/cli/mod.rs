//! CLI interface for wiimidi

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Play a synthesizer by swinging a motion controller
#[derive(Parser)]
#[command(name = "wiimidi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a recorded session through the mapping engine
    Replay {
        /// Configuration file path
        #[arg(short, long, default_value = "wiimidi.yaml")]
        config: PathBuf,

        /// Recording to replay (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Print events as JSON lines instead of sending MIDI
        #[arg(long)]
        dry_run: bool,

        /// Restart the recording when it ends
        #[arg(long = "loop")]
        looping: bool,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "wiimidi.yaml")]
        config: PathBuf,
    },

    /// List MIDI output ports
    Ports,

    /// Generate an example configuration file
    Init,
}
