//! CLI Module
//!
//! Command-line interface for Gelang.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gelang - trim an audio clip and classify its genre
#[derive(Parser, Debug)]
#[command(name = "gelang")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON settings file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Region selection shared by several commands
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct RegionArgs {
    /// Region start in seconds (default: 0)
    #[arg(short, long)]
    pub start: Option<f64>,

    /// Region end in seconds (default: start of clip + 30s)
    #[arg(short, long)]
    pub end: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show clip details and the initial region
    #[command(name = "inspect")]
    Inspect {
        /// Audio file
        file: PathBuf,
    },

    /// Play the region headlessly, printing the time cursor until it stops (WAV input only)
    #[command(name = "preview")]
    Preview {
        /// Audio file (WAV)
        file: PathBuf,

        #[command(flatten)]
        region: RegionArgs,

        /// Playback tick in milliseconds
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
    },

    /// Classify the genre of the selected region (WAV input only)
    ///
    /// The region is chosen against the clip duration read from the WAV
    /// header, so other audio formats are rejected before any request is
    /// sent. Convert MP3 clips to WAV first.
    #[command(name = "classify")]
    Classify {
        /// Audio file (WAV)
        file: PathBuf,

        #[command(flatten)]
        region: RegionArgs,

        /// Classification endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
}
