//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use dialoguer::Confirm;
use tracing::info;

use arun_core::config::defaults::{DEFAULT_CONFIG_TEMPLATE, DEFAULT_CONFIG_TOML};

use crate::cli::{output, Cli};

/// Write a default arun.toml
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Do not prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, yes = self.yes, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self
            .output
            .clone()
            .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_TOML));

        if config_path.exists() && !self.force {
            if self.yes {
                anyhow::bail!(
                    "Configuration file already exists at {}. Use --force to overwrite.",
                    config_path.display()
                );
            }

            let overwrite = Confirm::new()
                .with_prompt(format!(
                    "Configuration file already exists at {}. Overwrite?",
                    config_path.display()
                ))
                .default(false)
                .interact()?;

            if !overwrite {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
        }

        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
        info!(path = %config_path.display(), "wrote config");

        if !cli.quiet {
            output::success(&format!(
                "Created {}",
                output::path_style().apply_to(config_path.display())
            ));
            println!();
            println!("Next steps:");
            println!("  1. Set bridge.serial if more than one device is attached");
            println!("  2. Run 'arun doctor' to check the device connection");
            println!("  3. Run 'arun run <target> [args...]'");
        }

        Ok(())
    }
}
