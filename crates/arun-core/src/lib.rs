//! arun core - push a build output to an adb device and run it
//!
//! This crate classifies the target by its magic bytes, synthesizes the
//! remote shell command that runs it and removes every pushed file, and
//! drives the bridge executable through push, execute and cleanup.

pub mod artifact;
pub mod bridge;
pub mod command;
pub mod config;
pub mod discovery;
pub mod env;
pub mod error;
pub mod orchestrator;
pub mod reporter;
pub mod session;

pub use artifact::{classify, Artifact, Kind};
pub use bridge::{AdbBridge, Bridge, BridgeExit};
pub use command::{Clause, RemoteCommand};
pub use config::{load_config, load_config_or_default, Config};
pub use discovery::{find_candidates, Candidate};
pub use error::{ConfigError, Result, RunError};
pub use orchestrator::{Orchestrator, RunPlan};
pub use reporter::{RunEvent, RunReporter, TracingReporter};
pub use session::{InvocationSpec, RemoteSession};
