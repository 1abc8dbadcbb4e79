//! Effective settings: flags over environment over config file over defaults

use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;

use arun_core::config::{load_config, load_config_or_default};
use arun_core::env::{non_empty_var, verbose_from_env, BRIDGE_ENV, SERIAL_ENV};
use arun_core::{AdbBridge, Config};

use super::Cli;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Settings {
    /// Loaded or default configuration
    pub config: Config,

    /// Where the configuration came from
    pub config_path: Option<PathBuf>,

    /// Bridge executable name or path
    pub bridge_program: String,

    /// Device serial
    pub serial: Option<String>,

    /// Verbose output
    pub verbose: bool,
}

impl Settings {
    /// Resolve settings for `cli` from the process environment
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let (config, config_path) = match &cli.config {
            Some(path) => {
                let config = load_config(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                (config, Some(path.clone()))
            }
            None => {
                let cwd = std::env::current_dir()?;
                load_config_or_default(&cwd)?
            }
        };

        Ok(Self::with_config(cli, config, config_path))
    }

    /// Settings around an already loaded `config`, still honoring flags and environment
    pub fn with_config(cli: &Cli, config: Config, config_path: Option<PathBuf>) -> Self {
        let settings = Self::merge(
            cli,
            config,
            config_path,
            EnvOverrides {
                bridge: non_empty_var(BRIDGE_ENV),
                serial: non_empty_var(SERIAL_ENV),
                verbose: verbose_from_env(),
            },
        );
        debug!(?settings, "resolved settings");
        settings
    }

    fn merge(
        cli: &Cli,
        config: Config,
        config_path: Option<PathBuf>,
        env: EnvOverrides,
    ) -> Self {
        let bridge_program = cli
            .adb
            .clone()
            .or(env.bridge)
            .unwrap_or_else(|| config.bridge.program.clone());
        let serial = cli
            .serial
            .clone()
            .or(env.serial)
            .or_else(|| config.bridge.serial.clone());

        Self {
            config,
            config_path,
            bridge_program,
            serial,
            verbose: cli.verbose || env.verbose,
        }
    }

    /// Remote scratch directory
    pub fn scratch_dir(&self) -> &str {
        &self.config.remote.scratch_dir
    }

    /// Locate the bridge executable
    pub fn locate_bridge(&self) -> arun_core::Result<AdbBridge> {
        Ok(AdbBridge::locate(&self.bridge_program)?.with_serial(self.serial.clone()))
    }

    /// Bridge without resolving it on PATH, for plans that never invoke it
    pub fn unresolved_bridge(&self) -> AdbBridge {
        AdbBridge::new(&self.bridge_program).with_serial(self.serial.clone())
    }
}

/// Values read from the environment
#[derive(Debug, Default)]
struct EnvOverrides {
    bridge: Option<String>,
    serial: Option<String>,
    verbose: bool,
}
