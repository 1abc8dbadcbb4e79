//! Doctor command - check that the bridge and a device are reachable

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use arun_core::{AdbBridge, Config};

use crate::cli::settings::Settings;
use crate::cli::{Cli, OutputFormat};

/// Check that the bridge executable and a device are available
#[derive(Debug, Args)]
pub struct DoctorCommand {
    /// Show suggestions for fixing issues
    #[arg(long)]
    pub fix: bool,
}

/// Result of a single check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: Option<String>,
    pub fix_suggestion: Option<String>,
}

/// Status of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
    Skip,
}

/// Summary of all checks
#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub checks: Vec<CheckResult>,
    pub ok_count: usize,
    pub warn_count: usize,
    pub fail_count: usize,
    pub skip_count: usize,
}

impl DoctorSummary {
    fn new(checks: Vec<CheckResult>) -> Self {
        let count = |status| checks.iter().filter(|c| c.status == status).count();
        Self {
            ok_count: count(CheckStatus::Ok),
            warn_count: count(CheckStatus::Warn),
            fail_count: count(CheckStatus::Fail),
            skip_count: count(CheckStatus::Skip),
            checks,
        }
    }
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: Some(message.into()),
            fix_suggestion: None,
        }
    }

    fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix_suggestion = Some(fix.into());
        self
    }
}

impl DoctorCommand {
    /// Execute the doctor command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(fix = self.fix, "executing doctor command");
        let (settings, config_check) = load_settings(cli);

        if !cli.quiet && cli.format == OutputFormat::Text {
            println!("{}", style("Checking environment...").bold());
            println!();
        }

        let mut checks = vec![config_check];
        match settings.locate_bridge() {
            Ok(bridge) => {
                checks.push(CheckResult::new(
                    "Bridge",
                    CheckStatus::Ok,
                    bridge.program().display().to_string(),
                ));
                checks.push(check_version(&bridge));
                checks.push(check_device(&bridge));
            }
            Err(e) => {
                checks.push(
                    CheckResult::new("Bridge", CheckStatus::Fail, e.to_string()).with_fix(
                        "Install the Android SDK platform tools, or set ARUN_ADB or --adb",
                    ),
                );
                checks.push(CheckResult::new("Version", CheckStatus::Skip, "no bridge"));
                checks.push(CheckResult::new("Device", CheckStatus::Skip, "no bridge"));
            }
        }

        let summary = DoctorSummary::new(checks);
        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_results(&summary.checks);
                    print_summary(&summary);
                }
                if self.fix && (summary.fail_count > 0 || summary.warn_count > 0) {
                    println!();
                    println!("{}", style("Suggested fixes:").bold());
                    for check in &summary.checks {
                        if let Some(ref fix) = check.fix_suggestion {
                            println!(
                                "  {} {}: {}",
                                status_icon(check.status),
                                style(&check.name).bold(),
                                fix
                            );
                        }
                    }
                }
            }
        }

        if summary.fail_count > 0 {
            anyhow::bail!("{} check(s) failed", summary.fail_count);
        }
        Ok(())
    }
}

/// Load settings, falling back to defaults when the config file is broken
fn load_settings(cli: &Cli) -> (Settings, CheckResult) {
    match Settings::resolve(cli) {
        Ok(settings) => {
            let source = settings
                .config_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults (no arun.toml found)".to_string());
            let check = CheckResult::new(
                "Config",
                CheckStatus::Ok,
                format!("{}, scratch dir {}", source, settings.scratch_dir()),
            );
            (settings, check)
        }
        Err(e) => {
            let check = CheckResult::new("Config", CheckStatus::Fail, format!("{:#}", e))
                .with_fix("Edit the configuration file or run 'arun init --force'");
            (Settings::with_config(cli, Config::default(), None), check)
        }
    }
}

fn check_version(bridge: &AdbBridge) -> CheckResult {
    match bridge.query(&["version"]) {
        Some(out) => {
            let first = out.lines().next().unwrap_or_default().to_string();
            CheckResult::new("Version", CheckStatus::Ok, first)
        }
        None => CheckResult::new("Version", CheckStatus::Warn, "could not read version"),
    }
}

fn check_device(bridge: &AdbBridge) -> CheckResult {
    device_result(bridge.query(&["get-state"]).as_deref(), bridge.serial())
}

fn device_result(state: Option<&str>, serial: Option<&str>) -> CheckResult {
    let label = serial.unwrap_or("default device");
    match state {
        Some("device") => CheckResult::new("Device", CheckStatus::Ok, format!("{} ready", label)),
        Some(other) => CheckResult::new("Device", CheckStatus::Warn, format!("{} is {}", label, other))
            .with_fix("Unlock the device and accept the USB debugging prompt"),
        None => CheckResult::new("Device", CheckStatus::Fail, format!("{} not connected", label))
            .with_fix("Run 'adb devices' and pass --serial when more than one device is attached"),
    }
}

fn print_results(checks: &[CheckResult]) {
    for check in checks {
        let message = check.message.as_deref().unwrap_or("");
        println!(
            "  {} {} {}",
            status_icon(check.status),
            style(&check.name).bold(),
            style(message).dim()
        );
    }
}

fn print_summary(summary: &DoctorSummary) {
    println!();
    println!(
        "{} passed, {} warnings, {} failed, {} skipped",
        style(summary.ok_count).green(),
        style(summary.warn_count).yellow(),
        style(summary.fail_count).red(),
        style(summary.skip_count).dim()
    );
}

fn status_icon(status: CheckStatus) -> console::StyledObject<&'static str> {
    match status {
        CheckStatus::Ok => style("[OK]").green(),
        CheckStatus::Warn => style("[WARN]").yellow(),
        CheckStatus::Fail => style("[FAIL]").red(),
        CheckStatus::Skip => style("[SKIP]").dim(),
    }
}
