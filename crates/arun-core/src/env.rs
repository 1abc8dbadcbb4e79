//! Environment variables read by arun

use std::path::PathBuf;

use tracing::warn;

/// Colon-separated list of extra files to push with the target
pub const COPY_ENV: &str = "ARUN_COPY";

/// Enables verbose output when set to `1` or `true`
pub const VERBOSE_ENV: &str = "ARUN_VERBOSE";

/// Overrides the bridge executable
pub const BRIDGE_ENV: &str = "ARUN_ADB";

/// Device serial, shared with adb itself
pub const SERIAL_ENV: &str = "ANDROID_SERIAL";

/// Split a colon-separated file list, keeping existing regular files only
pub fn parse_extra_files(value: &str) -> Vec<PathBuf> {
    value
        .trim()
        .split(':')
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let path = PathBuf::from(entry);
            if std::fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false) {
                Some(path)
            } else {
                warn!(path = entry, "skipping {} entry that is not a regular file", COPY_ENV);
                None
            }
        })
        .collect()
}

/// Extra files listed in `ARUN_COPY`
pub fn extra_files_from_env() -> Vec<PathBuf> {
    std::env::var(COPY_ENV)
        .map(|value| parse_extra_files(&value))
        .unwrap_or_default()
}

/// `1` or `true`, ignoring case and surrounding whitespace
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    value == "1" || value == "true"
}

/// Whether `ARUN_VERBOSE` asks for verbose output
pub fn verbose_from_env() -> bool {
    std::env::var(VERBOSE_ENV)
        .map(|value| is_truthy(&value))
        .unwrap_or(false)
}

/// Non-empty value of an environment variable
pub fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy(" TRUE \n"));
        assert!(!is_truthy("yes"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn test_parse_extra_files_keeps_regular_files() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("libfoo.so");
        let conf = temp.path().join("app.conf");
        std::fs::write(&lib, b"\x7fELF").unwrap();
        std::fs::write(&conf, b"k=v").unwrap();
        let missing = temp.path().join("missing.so");

        let value = format!(
            "{}:{}::{}:{}",
            lib.display(),
            missing.display(),
            temp.path().display(),
            conf.display()
        );
        assert_eq!(parse_extra_files(&value), vec![lib, conf]);
    }

    #[test]
    fn test_parse_extra_files_blank() {
        assert!(parse_extra_files("").is_empty());
        assert!(parse_extra_files("   ").is_empty());
    }
}
