//! CLI Module
//!
//! Command-line interface over the parameter mappings and the backend.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kicklab - drum workstation control plane
#[derive(Parser, Debug)]
#[command(name = "kicklab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON config file (environment overrides still apply)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Account name for commands that need a session
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Account password
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a knob position (0-100) to a parameter value
    #[command(name = "map")]
    Map {
        /// Snapshot key, e.g. noise_low_pass_freq
        param: String,

        /// Knob position, or a native value with --reverse
        value: f64,

        /// Convert a native value back to a knob position
        #[arg(short, long)]
        reverse: bool,
    },

    /// List the parameters and their ranges
    #[command(name = "params")]
    Params,

    /// List shared presets (and your own when signed in)
    #[command(name = "presets")]
    Presets,

    /// List your generated kicks and remaining quota
    #[command(name = "kicks")]
    Kicks,

    /// Generate a new kick
    #[command(name = "generate")]
    Generate,

    /// Delete a generated kick
    #[command(name = "delete-kick")]
    DeleteKick {
        /// Kick id (see `kicks`)
        id: u64,

        /// Also delete the presets that use it
        #[arg(long)]
        confirm: bool,
    },
}
