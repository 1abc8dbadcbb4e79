//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "arun.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "arun.yaml";

/// Writable directory on the device that needs no elevated privileges
pub const DEFAULT_SCRATCH_DIR: &str = "/data/local/tmp";

/// Build directory scanned by `arun pick`
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Directory depth scanned by `arun pick`
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".arun.toml",
        ".arun.yaml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# arun configuration

[bridge]
program = "adb"

[remote]
scratch_dir = "/data/local/tmp"

[discovery]
build_dir = "build"
max_depth = 4
"#;
