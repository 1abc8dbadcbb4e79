//! CLI definition and command handling

pub mod commands;
pub mod output;
pub mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use commands::{CompletionsCommand, DoctorCommand, InitCommand, PickCommand, RunCommand};

/// arun - push a native executable or class archive to a device and run it
#[derive(Debug, Parser)]
#[command(name = "arun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (also ARUN_VERBOSE=1)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: search for arun.toml upwards)
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Bridge executable (default: adb on PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub adb: Option<String>,

    /// Device serial to target
    #[arg(short = 's', long, global = true)]
    pub serial: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Push a target to the device, run it and remove it
    Run(RunCommand),

    /// Choose a runnable output from the build directory and run it
    Pick(PickCommand),

    /// Check that the bridge and a device are available
    Doctor(DoctorCommand),

    /// Write a default arun.toml
    Init(InitCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Run(ref cmd) => cmd.execute(&self),
            Commands::Pick(ref cmd) => cmd.execute(&self),
            Commands::Doctor(ref cmd) => cmd.execute(&self),
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}
