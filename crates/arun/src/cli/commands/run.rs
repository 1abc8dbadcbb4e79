//! Run command - push a target, run it on the device and clean up

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, ValueHint};
use tracing::info;

use arun_core::env::extra_files_from_env;
use arun_core::{Bridge, Orchestrator, RunEvent, RunPlan, RunReporter, TracingReporter};

use crate::cli::output;
use crate::cli::settings::Settings;
use crate::cli::{Cli, OutputFormat};

/// Push a native executable or class archive to the device and run it
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Extra file to push next to the target (repeatable, adds to ARUN_COPY)
    #[arg(short = 'c', long = "copy", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub copy: Vec<PathBuf>,

    /// Show what would be pushed and run without touching the device
    #[arg(long)]
    pub dry_run: bool,

    /// Executable or archive to run, followed by the program's arguments.
    /// Options stop at the target; for an archive the first argument names
    /// the main class
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "TARGET",
        value_hint = ValueHint::FilePath
    )]
    pub command: Vec<String>,
}

impl RunCommand {
    /// Target path and forwarded arguments
    pub fn target_and_args(&self) -> anyhow::Result<(PathBuf, &[String])> {
        match self.command.split_first() {
            Some((target, args)) => Ok((PathBuf::from(target), args)),
            None => anyhow::bail!("No target given"),
        }
    }

    /// Execute the run command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let (target, args) = self.target_and_args()?;
        info!(
            path = %target.display(),
            copy = self.copy.len(),
            args = args.len(),
            dry_run = self.dry_run,
            "executing run command"
        );
        let settings = Settings::resolve(cli)?;
        launch(cli, &settings, &target, &self.copy, args, self.dry_run)
    }
}

/// `--copy` files first, then valid `ARUN_COPY` entries
pub(crate) fn merge_extras(copy: &[PathBuf], from_env: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut extras = copy.to_vec();
    extras.extend(from_env);
    extras
}

/// Plan a run, then either print the plan or carry it out
pub(crate) fn launch(
    cli: &Cli,
    settings: &Settings,
    target: &Path,
    copy: &[PathBuf],
    args: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let extras = merge_extras(copy, extra_files_from_env());
    let reporter: Arc<dyn RunReporter> = Arc::new(ConsoleReporter { quiet: cli.quiet });

    // Local checks first; the bridge is only looked up once the plan holds
    let planner = orchestrator(settings.unresolved_bridge(), settings, reporter.clone());
    let plan = planner.plan(target, &extras, args)?;

    if dry_run {
        return print_plan(cli, &plan);
    }

    let runner = orchestrator(settings.locate_bridge()?, settings, reporter);
    runner.execute(&plan)?;
    Ok(())
}

fn orchestrator<B: Bridge>(
    bridge: B,
    settings: &Settings,
    reporter: Arc<dyn RunReporter>,
) -> Orchestrator<B> {
    Orchestrator::new(bridge)
        .with_scratch_dir(settings.scratch_dir())
        .with_verbose(settings.verbose)
        .with_reporter(reporter)
}

fn print_plan(cli: &Cli, plan: &RunPlan) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let pushes: Vec<_> = plan
                .pushes
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "local": item.local,
                        "remote": item.remote,
                    })
                })
                .collect();
            let value = serde_json::json!({
                "target": plan.artifact.path,
                "kind": plan.artifact.kind,
                "pushes": pushes,
                "command": plan.command.to_args(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{}", output::header("Dry run"));
            println!(
                "{}",
                output::key_value("target", &plan.artifact.path.display().to_string())
            );
            println!("{}", output::key_value("kind", plan.artifact.kind.as_str()));
            println!();
            println!("{}", output::header("Push"));
            for item in &plan.pushes {
                println!(
                    "  {} -> {}",
                    output::path_style().apply_to(item.local.display()),
                    item.remote
                );
            }
            println!();
            println!("{}", output::header("Remote command"));
            println!("  {}", plan.command.render());
        }
    }
    Ok(())
}

/// Prints verbose-mode notices unless `--quiet` is given
struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    fn line(&self, event: &RunEvent) -> Option<String> {
        match event {
            RunEvent::Notice { message } if !self.quiet => Some(message.clone()),
            _ => None,
        }
    }
}

impl RunReporter for ConsoleReporter {
    fn report(&self, event: &RunEvent) {
        TracingReporter.report(event);
        if let Some(line) = self.line(event) {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Commands;
    use arun_core::{Config, RunError};
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn run_cmd(cli: &Cli) -> &RunCommand {
        match &cli.command {
            Commands::Run(cmd) => cmd,
            other => panic!("expected run, got {:?}", other),
        }
    }

    fn forwarded(cmd: &RunCommand) -> Vec<String> {
        cmd.target_and_args().unwrap().1.to_vec()
    }

    #[test]
    fn test_forwards_trailing_args() {
        let cli = parse(&["arun", "run", "./app", "hello", "--flag", "x"]);
        let cmd = run_cmd(&cli);
        let (target, args) = cmd.target_and_args().unwrap();
        assert_eq!(target, PathBuf::from("./app"));
        assert_eq!(args, ["hello", "--flag", "x"]);
        assert!(cmd.copy.is_empty());
        assert!(!cmd.dry_run);
    }

    #[test]
    fn test_options_stop_at_target() {
        let cli = parse(&["arun", "run", "./app", "-v"]);
        let cmd = run_cmd(&cli);
        assert_eq!(forwarded(cmd), vec!["-v"]);
        assert!(!cli.verbose);

        let cli = parse(&["arun", "run", "./app", "-s", "x"]);
        let cmd = run_cmd(&cli);
        assert_eq!(forwarded(cmd), vec!["-s", "x"]);
        assert_eq!(cli.serial, None);

        let cli = parse(&["arun", "run", "./app", "--help"]);
        let cmd = run_cmd(&cli);
        assert_eq!(forwarded(cmd), vec!["--help"]);

        let cli = parse(&["arun", "run", "./app", "--dry-run", "-c", "lib.so"]);
        let cmd = run_cmd(&cli);
        assert_eq!(forwarded(cmd), vec!["--dry-run", "-c", "lib.so"]);
        assert!(!cmd.dry_run);
        assert!(cmd.copy.is_empty());
    }

    #[test]
    fn test_options_before_target() {
        let cli = parse(&[
            "arun", "-v", "run", "-c", "libfoo.so", "--copy", "data.bin", "--dry-run", "app",
            "-x",
        ]);
        let cmd = run_cmd(&cli);
        assert!(cli.verbose);
        assert!(cmd.dry_run);
        assert_eq!(
            cmd.copy,
            vec![PathBuf::from("libfoo.so"), PathBuf::from("data.bin")]
        );
        assert_eq!(cmd.target_and_args().unwrap().0, PathBuf::from("app"));
        assert_eq!(forwarded(cmd), vec!["-x"]);
    }

    #[test]
    fn test_target_is_required() {
        assert!(Cli::try_parse_from(["arun", "run"]).is_err());
    }

    #[test]
    fn test_copy_flags_come_before_env_entries() {
        let extras = merge_extras(
            &[PathBuf::from("a.so"), PathBuf::from("b.so")],
            vec![PathBuf::from("env.so")],
        );
        assert_eq!(
            extras,
            vec![
                PathBuf::from("a.so"),
                PathBuf::from("b.so"),
                PathBuf::from("env.so")
            ]
        );
    }

    #[test]
    fn test_console_reporter_prints_notices_unless_quiet() {
        let notice = RunEvent::Notice {
            message: "prepare to push /tmp/app to device".to_string(),
        };
        let pushing = RunEvent::Pushing {
            local: PathBuf::from("/tmp/app"),
            remote: "/data/local/tmp/app".to_string(),
        };

        let reporter = ConsoleReporter { quiet: false };
        assert_eq!(
            reporter.line(&notice).as_deref(),
            Some("prepare to push /tmp/app to device")
        );
        assert_eq!(reporter.line(&pushing), None);

        let reporter = ConsoleReporter { quiet: true };
        assert_eq!(reporter.line(&notice), None);
    }

    fn no_bridge_cli() -> Cli {
        Cli::try_parse_from(["arun", "-q", "--adb", "/nonexistent/arun-test-adb", "doctor"])
            .unwrap()
    }

    #[test]
    fn test_dry_run_never_looks_for_the_bridge() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app");
        std::fs::write(&target, b"\x7fELF\x02").unwrap();

        let cli = no_bridge_cli();
        let settings = Settings::with_config(&cli, Config::default(), None);
        launch(&cli, &settings, &target, &[], &["hello".to_string()], true).unwrap();

        let err = launch(&cli, &settings, &target, &[], &[], false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::BridgeNotFound { .. })
        ));
    }

    #[test]
    fn test_bad_target_reported_before_missing_bridge() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("notes.txt");
        std::fs::write(&target, b"plain text").unwrap();

        let cli = no_bridge_cli();
        let settings = Settings::with_config(&cli, Config::default(), None);
        let err = launch(&cli, &settings, &target, &[], &[], false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::NotExecutableOrArchive { .. })
        ));
    }
}
