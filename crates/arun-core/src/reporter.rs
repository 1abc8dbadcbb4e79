//! Run progress reporting

use std::path::PathBuf;

use crate::artifact::Kind;
use crate::bridge::BridgeExit;

/// Events emitted while a run progresses
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// The primary artifact was classified
    Classified { path: PathBuf, kind: Kind },
    /// A file is about to be pushed
    Pushing { local: PathBuf, remote: String },
    /// The remote command is about to run
    Executing { command: String },
    /// The bridge shell returned
    Finished { exit: BridgeExit },
    /// Progress line requested by verbose mode
    Notice { message: String },
}

/// Trait for reporting run progress
pub trait RunReporter: Send + Sync {
    /// Handle a run event
    fn report(&self, event: &RunEvent);
}

/// Reporter that logs to tracing
#[derive(Debug, Default)]
pub struct TracingReporter;

impl RunReporter for TracingReporter {
    fn report(&self, event: &RunEvent) {
        match event {
            RunEvent::Classified { path, kind } => {
                tracing::info!(path = %path.display(), %kind, "classified target");
            }
            RunEvent::Pushing { local, remote } => {
                tracing::info!(local = %local.display(), %remote, "pushing");
            }
            RunEvent::Executing { command } => {
                tracing::debug!(%command, "executing remote command");
            }
            RunEvent::Finished { exit } => {
                tracing::info!(%exit, "remote shell finished");
            }
            RunEvent::Notice { message } => {
                tracing::debug!(%message, "notice");
            }
        }
    }
}
