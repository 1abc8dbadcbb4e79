//! Artifact classification
//!
//! A target is identified by its leading bytes only: ELF executables run
//! directly, zip archives are treated as class archives launched through
//! `app_process`. Any zip counts as a class archive, so a zip without a
//! runnable entry point is only caught on the device.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, RunError};

/// ELF magic number
const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// Zip local file header prefix
const ZIP_MAGIC: [u8; 2] = [b'P', b'K'];

/// Number of bytes read from the head of a file
const PROBE_LEN: u64 = ELF_MAGIC.len() as u64;

/// Kind of a local artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// ELF executable, run directly
    NativeExecutable,
    /// Zip archive of classes, run through the managed runtime
    ManagedArchive,
    /// Neither signature matched
    Unknown,
}

impl Kind {
    /// Classify a byte prefix
    pub fn from_prefix(prefix: &[u8]) -> Self {
        if prefix.starts_with(&ELF_MAGIC) {
            Self::NativeExecutable
        } else if prefix.starts_with(&ZIP_MAGIC) {
            Self::ManagedArchive
        } else {
            Self::Unknown
        }
    }

    /// Whether the kind can be launched on the device
    pub fn is_runnable(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Short human-readable label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeExecutable => "executable",
            Self::ManagedArchive => "archive",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the leading bytes of `path` and classify them.
///
/// Files shorter than a signature are `Unknown`; files that cannot be opened
/// or read fail with [`RunError::NotAccessible`].
pub fn classify(path: &Path) -> Result<Kind> {
    let not_accessible = |source| RunError::NotAccessible {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(not_accessible)?;
    let mut prefix = Vec::with_capacity(PROBE_LEN as usize);
    file.take(PROBE_LEN)
        .read_to_end(&mut prefix)
        .map_err(not_accessible)?;

    let kind = Kind::from_prefix(&prefix);
    debug!(path = %path.display(), %kind, probed = prefix.len(), "classified artifact");
    Ok(kind)
}

/// A local file and the kind derived from its contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Path to the local file
    pub path: PathBuf,

    /// Kind derived at construction
    pub kind: Kind,
}

impl Artifact {
    /// Classify the file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let kind = classify(&path)?;
        Ok(Self { path, kind })
    }

    /// Classify the file at `path`, rejecting files that cannot be launched
    pub fn open_runnable(path: impl Into<PathBuf>) -> Result<Self> {
        let artifact = Self::open(path)?;
        if !artifact.kind.is_runnable() {
            return Err(RunError::NotExecutableOrArchive {
                path: artifact.path,
            });
        }
        Ok(artifact)
    }
}
