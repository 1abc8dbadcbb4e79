//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::{DEFAULT_BUILD_DIR, DEFAULT_MAX_DEPTH, DEFAULT_SCRATCH_DIR};

/// Main configuration for arun
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bridge executable settings
    pub bridge: BridgeConfig,

    /// Device-side layout
    pub remote: RemoteConfig,

    /// Build output discovery
    pub discovery: DiscoveryConfig,
}

/// Bridge executable settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Executable name or path, resolved on PATH
    pub program: String,

    /// Device serial passed as `-s`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: "adb".to_string(),
            serial: None,
        }
    }
}

/// Device-side layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Directory every file is pushed to
    pub scratch_dir: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            scratch_dir: DEFAULT_SCRATCH_DIR.to_string(),
        }
    }
}

/// Build output discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Directory scanned for runnable outputs, relative to the config file
    pub build_dir: PathBuf,

    /// Maximum directory depth
    pub max_depth: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
