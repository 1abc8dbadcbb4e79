//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_bridge(config)?;
    validate_remote(config)?;
    validate_discovery(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_bridge(config: &Config) -> Result<()> {
    if config.bridge.program.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "bridge.program".to_string(),
            message: "program cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_remote(config: &Config) -> Result<()> {
    let dir = config.remote.scratch_dir.trim_end_matches('/');

    if !config.remote.scratch_dir.starts_with('/') {
        return Err(ConfigError::InvalidValue {
            field: "remote.scratch_dir".to_string(),
            message: "must be an absolute path".to_string(),
        }
        .into());
    }

    if dir.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "remote.scratch_dir".to_string(),
            message: "cannot be the filesystem root".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_discovery(config: &Config) -> Result<()> {
    if config.discovery.max_depth == 0 {
        return Err(ConfigError::InvalidValue {
            field: "discovery.max_depth".to_string(),
            message: "must be at least 1".to_string(),
        }
        .into());
    }

    Ok(())
}
