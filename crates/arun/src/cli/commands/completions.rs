//! Shell completions

use std::path::PathBuf;

use clap::{Args, CommandFactory, ValueHint};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::{output, Cli};

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "executing completions command");
        let script = render(self.shell);

        match &self.output {
            Some(path) => {
                std::fs::write(path, script)?;
                if !cli.quiet {
                    output::success(&format!("Completions written to {}", path.display()));
                }
            }
            None => print!("{}", String::from_utf8_lossy(&script)),
        }
        Ok(())
    }
}

/// Completion script for `shell`, named after the binary
fn render(shell: Shell) -> Vec<u8> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut buf = Vec::new();
    generate(shell, &mut cmd, name, &mut buf);
    buf
}
