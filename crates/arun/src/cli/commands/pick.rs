//! Pick command - choose a runnable build output and run it

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{Args, ValueHint};
use console::Term;
use dialoguer::Select;
use tracing::info;

use arun_core::{find_candidates, Candidate};

use crate::cli::output;
use crate::cli::settings::Settings;
use crate::cli::{Cli, OutputFormat};

use super::run::launch;

/// Scan the build directory for runnable outputs and run one
#[derive(Debug, Args)]
pub struct PickCommand {
    /// Directory to scan (default: discovery.build_dir from the config)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Run the Nth candidate (1-based) without prompting
    #[arg(short = 'n', long)]
    pub index: Option<usize>,

    /// List candidates and exit (as JSON with --format json)
    #[arg(short, long)]
    pub list: bool,

    /// Extra file to push next to the target (repeatable, adds to ARUN_COPY)
    #[arg(short = 'c', long = "copy", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub copy: Vec<PathBuf>,

    /// Show what would be pushed and run without touching the device
    #[arg(long)]
    pub dry_run: bool,

    /// Arguments for the program, after `--`
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// How the target gets chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    /// Zero-based candidate index
    Run(usize),
    Prompt,
}

impl PickCommand {
    /// Execute the pick command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(dir = ?self.dir, index = ?self.index, "executing pick command");
        let settings = Settings::resolve(cli)?;
        let root = self.scan_root(&settings)?;
        let candidates = find_candidates(&root, settings.config.discovery.max_depth)?;

        if self.list {
            return print_candidates(cli, &root, &candidates);
        }

        let index = match choose(candidates.len(), self.index)? {
            Choice::Run(index) => index,
            Choice::Prompt => prompt(&root, &candidates)?,
        };
        let target = &candidates[index].path;
        info!(path = %target.display(), "picked target");

        launch(cli, &settings, target, &self.copy, &self.args, self.dry_run)
    }

    /// `--dir` is relative to the working directory, the configured build
    /// directory to the config file
    fn scan_root(&self, settings: &Settings) -> anyhow::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        if let Some(dir) = &self.dir {
            return Ok(cwd.join(dir));
        }
        let base = settings
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        Ok(base.join(&settings.config.discovery.build_dir))
    }
}

fn choose(count: usize, index: Option<usize>) -> anyhow::Result<Choice> {
    match (count, index) {
        (0, _) => bail!("No runnable outputs found"),
        (_, Some(n)) if n == 0 || n > count => {
            bail!("Index {} is out of range (1-{})", n, count)
        }
        (_, Some(n)) => Ok(Choice::Run(n - 1)),
        (1, None) => Ok(Choice::Run(0)),
        (_, None) => Ok(Choice::Prompt),
    }
}

fn display_name(root: &Path, candidate: &Candidate) -> String {
    let rel = candidate.path.strip_prefix(root).unwrap_or(&candidate.path);
    format!(
        "{} ({}, {})",
        rel.display(),
        candidate.kind,
        output::human_size(candidate.size)
    )
}

fn prompt(root: &Path, candidates: &[Candidate]) -> anyhow::Result<usize> {
    if !Term::stdout().is_term() {
        bail!(
            "{} runnable outputs found; pass --index to choose one",
            candidates.len()
        );
    }
    let items: Vec<String> = candidates.iter().map(|c| display_name(root, c)).collect();
    let selection = Select::new()
        .with_prompt("Output to run")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(selection)
}

fn print_candidates(cli: &Cli, root: &Path, candidates: &[Candidate]) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(candidates)?);
        }
        OutputFormat::Text => {
            if candidates.is_empty() {
                output::warning(&format!("No runnable outputs under {}", root.display()));
                return Ok(());
            }
            for (i, candidate) in candidates.iter().enumerate() {
                println!("{:>3}. {}", i + 1, display_name(root, candidate));
            }
        }
    }
    Ok(())
}
