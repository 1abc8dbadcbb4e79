//! Push, execute and clean up
//!
//! A run classifies the primary artifact, resolves every local path, builds
//! the remote command, then pushes each file and invokes the bridge shell
//! once. All local checks happen before the first bridge call. Removal of
//! pushed files is part of the remote command itself, so it happens on the
//! device even when the program fails.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::artifact::{Artifact, Kind};
use crate::bridge::Bridge;
use crate::command::RemoteCommand;
use crate::config::DEFAULT_SCRATCH_DIR;
use crate::error::{Result, RunError};
use crate::reporter::{RunEvent, RunReporter, TracingReporter};
use crate::session::{remote_path_for, InvocationSpec, RemoteSession};

/// A file queued for push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushItem {
    /// Absolute local path
    pub local: PathBuf,

    /// Destination path on the device
    pub remote: String,
}

/// Everything needed to run, computed without touching the device
#[derive(Debug, Clone)]
pub struct RunPlan {
    /// Classified primary artifact
    pub artifact: Artifact,

    /// Files to push, primary first
    pub pushes: Vec<PushItem>,

    /// Resolved invocation
    pub spec: InvocationSpec,

    /// Remote command for the shell stage
    pub command: RemoteCommand,
}

/// Coordinates one push/execute/cleanup cycle over a bridge
pub struct Orchestrator<B: Bridge> {
    bridge: B,
    scratch_dir: String,
    verbose: bool,
    reporter: Arc<dyn RunReporter>,
}

impl<B: Bridge> Orchestrator<B> {
    /// Create an orchestrator using the default scratch directory
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            scratch_dir: DEFAULT_SCRATCH_DIR.to_string(),
            verbose: false,
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<String>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Announce each push and echo the remote command
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn RunReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// The underlying bridge
    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Remote scratch directory
    pub fn scratch_dir(&self) -> &str {
        &self.scratch_dir
    }

    /// Classify, resolve and build without any bridge interaction
    pub fn plan(&self, primary: &Path, extras: &[PathBuf], args: &[String]) -> Result<RunPlan> {
        let artifact = Artifact::open_runnable(primary)?;
        self.reporter.report(&RunEvent::Classified {
            path: artifact.path.clone(),
            kind: artifact.kind,
        });

        if artifact.kind == Kind::ManagedArchive && args.is_empty() {
            return Err(RunError::NoEntryPointSpecified);
        }

        let primary_item = self.push_item(primary)?;
        let extra_items = extras
            .iter()
            .map(|path| self.push_item(path))
            .collect::<Result<Vec<_>>>()?;

        let mut session = RemoteSession::new();
        for item in std::iter::once(&primary_item).chain(&extra_items) {
            session.record(item.remote.clone());
        }
        for dupe in session.collisions() {
            warn!(remote = dupe, "several files share this remote path; the last push wins");
        }

        let spec = InvocationSpec::new(artifact.kind, primary_item.remote.clone())
            .with_extras(extra_items.iter().map(|item| item.remote.clone()))
            .with_args(args.iter().cloned())
            .with_verbose(self.verbose);
        let command = RemoteCommand::build(&spec, &self.scratch_dir)?;

        let mut pushes = vec![primary_item];
        pushes.extend(extra_items);

        Ok(RunPlan {
            artifact,
            pushes,
            spec,
            command,
        })
    }

    fn push_item(&self, path: &Path) -> Result<PushItem> {
        let local = absolute(path)?;
        let remote = remote_path_for(&self.scratch_dir, &local).ok_or_else(|| {
            RunError::PathResolutionFailed {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no file name",
                ),
            }
        })?;
        Ok(PushItem { local, remote })
    }

    /// Push every file, run the program and let the remote command clean up
    pub fn run(&self, primary: &Path, extras: &[PathBuf], args: &[String]) -> Result<()> {
        let plan = self.plan(primary, extras, args)?;
        self.execute(&plan)
    }

    /// Carry out a prepared plan
    pub fn execute(&self, plan: &RunPlan) -> Result<()> {
        let remote_dir = format!("{}/", self.scratch_dir.trim_end_matches('/'));

        for item in &plan.pushes {
            if plan.spec.verbose {
                self.reporter.report(&RunEvent::Notice {
                    message: format!("prepare to push {} to device", item.local.display()),
                });
            }
            self.reporter.report(&RunEvent::Pushing {
                local: item.local.clone(),
                remote: item.remote.clone(),
            });

            let exit = self
                .bridge
                .push(&item.local, &remote_dir)
                .map_err(|e| RunError::TransferFailed {
                    path: item.local.clone(),
                    reason: format!("could not start {}: {}", self.bridge.name(), e),
                })?;
            if !exit.is_success() {
                return Err(RunError::TransferFailed {
                    path: item.local.clone(),
                    reason: format!("{} push returned {}", self.bridge.name(), exit),
                });
            }
            debug!(remote = %item.remote, "pushed");
        }

        let args = plan.command.to_args();
        if plan.spec.verbose {
            self.reporter.report(&RunEvent::Notice {
                message: plan.command.render(),
            });
        }
        self.reporter.report(&RunEvent::Executing {
            command: args.join(" "),
        });

        let exit = self
            .bridge
            .shell(&args)
            .map_err(|e| RunError::ExecutionFailed {
                code: None,
                reason: format!("could not start {}: {}", self.bridge.name(), e),
            })?;
        self.reporter.report(&RunEvent::Finished { exit });

        if !exit.is_success() {
            return Err(RunError::ExecutionFailed {
                code: exit.code,
                reason: format!("{} shell returned {}", self.bridge.name(), exit),
            });
        }

        info!(
            artifact = %plan.artifact.path.display(),
            files = plan.pushes.len(),
            "run completed"
        );
        Ok(())
    }
}

/// Make `path` absolute against the current directory without following links
fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|source| RunError::PathResolutionFailed {
            path: path.to_path_buf(),
            source,
        })?;
        cwd.join(path)
    };
    Ok(joined.components().collect())
}
