//! Device bridge transport
//!
//! The bridge is an external executable (adb) driven as a subprocess. The
//! [`Bridge`] trait is the seam the orchestrator talks through; [`AdbBridge`]
//! is the real implementation.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{Result, RunError};

/// Exit status of one bridge invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeExit {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl BridgeExit {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn with_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl std::fmt::Display for BridgeExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Transport that can copy files to the device and run shell commands there
pub trait Bridge {
    /// Display name used in messages
    fn name(&self) -> &str;

    /// Run the bridge with `args`, stdio inherited from this process
    fn invoke(&self, args: &[String]) -> std::io::Result<BridgeExit>;

    /// `push <local> <remote_dir>`
    fn push(&self, local: &Path, remote_dir: &str) -> std::io::Result<BridgeExit> {
        self.invoke(&[
            "push".to_string(),
            local.display().to_string(),
            remote_dir.to_string(),
        ])
    }

    /// `shell <command...>`
    fn shell(&self, command: &[String]) -> std::io::Result<BridgeExit> {
        let mut args = Vec::with_capacity(command.len() + 1);
        args.push("shell".to_string());
        args.extend(command.iter().cloned());
        self.invoke(&args)
    }
}

/// adb subprocess bridge
#[derive(Debug, Clone)]
pub struct AdbBridge {
    program: PathBuf,
    serial: Option<String>,
}

impl AdbBridge {
    /// Default executable name
    pub const DEFAULT_PROGRAM: &'static str = "adb";

    /// Use `program` as given
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            serial: None,
        }
    }

    /// Resolve `program` on `PATH` (or as a path) with `which`
    pub fn locate(program: &str) -> Result<Self> {
        let resolved = which::which(program).map_err(|_| RunError::BridgeNotFound {
            program: program.to_string(),
        })?;
        info!(program, path = %resolved.display(), "located bridge");
        Ok(Self::new(resolved))
    }

    /// Target one device by serial
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial.filter(|s| !s.trim().is_empty());
        self
    }

    /// Resolved executable path
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Device serial, if one is pinned
    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Full argument list including the serial selector
    pub fn command_args(&self, args: &[String]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(serial) = &self.serial {
            full.push("-s".to_string());
            full.push(serial.clone());
        }
        full.extend(args.iter().cloned());
        full
    }

    /// Run a bridge query and capture its trimmed stdout
    pub fn query(&self, args: &[&str]) -> Option<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let output = Command::new(&self.program)
            .args(self.command_args(&args))
            .stdin(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Some(stdout)
    }
}

impl Bridge for AdbBridge {
    fn name(&self) -> &str {
        self.program
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(Self::DEFAULT_PROGRAM)
    }

    fn invoke(&self, args: &[String]) -> std::io::Result<BridgeExit> {
        let args = self.command_args(args);
        debug!(program = %self.program.display(), ?args, "invoking bridge");

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;

        Ok(BridgeExit {
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_prefix() {
        let bridge = AdbBridge::new("adb").with_serial(Some("emulator-5554".to_string()));
        assert_eq!(
            bridge.command_args(&["shell".to_string(), "ls".to_string()]),
            vec!["-s", "emulator-5554", "shell", "ls"]
        );

        let bridge = AdbBridge::new("adb").with_serial(Some("  ".to_string()));
        assert_eq!(bridge.serial(), None);
        assert_eq!(bridge.command_args(&["devices".to_string()]), vec!["devices"]);
    }

    #[test]
    fn test_name_from_program_path() {
        let bridge = AdbBridge::new("/opt/android/platform-tools/adb");
        assert_eq!(bridge.name(), "adb");
    }

    #[test]
    fn test_locate_missing_program() {
        let err = AdbBridge::locate("arun-no-such-bridge-binary").unwrap_err();
        assert!(matches!(err, RunError::BridgeNotFound { .. }));
    }

    #[test]
    fn test_exit_display() {
        assert_eq!(BridgeExit::with_code(3).to_string(), "exit status 3");
        assert_eq!(BridgeExit { code: None }.to_string(), "terminated by signal");
        assert!(BridgeExit::success().is_success());
    }
}
