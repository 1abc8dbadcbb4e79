//! Remote session bookkeeping
//!
//! Every file pushed by one invocation lands in the scratch directory under
//! its base name. The session records those paths so each one gets a removal
//! clause in the remote command.

use std::path::Path;

use crate::artifact::Kind;

/// Join the base name of `local` under `scratch_dir`.
///
/// Returns `None` when the path has no usable file name.
pub fn remote_path_for(scratch_dir: &str, local: &Path) -> Option<String> {
    let name = local.file_name()?.to_str()?;
    Some(format!("{}/{}", scratch_dir.trim_end_matches('/'), name))
}

/// Remote paths created by one invocation, primary first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSession {
    paths: Vec<String>,
}

impl RemoteSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pushed path
    pub fn record(&mut self, remote_path: impl Into<String>) {
        self.paths.push(remote_path.into());
    }

    /// All recorded paths in push order
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Number of recorded paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Base names recorded more than once
    pub fn collisions(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dupes = Vec::new();
        for path in &self.paths {
            if !seen.insert(path.as_str()) && !dupes.contains(&path.as_str()) {
                dupes.push(path.as_str());
            }
        }
        dupes
    }
}

/// Resolved plan for one remote run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    /// Kind of the primary artifact
    pub kind: Kind,

    /// Remote path of the primary artifact
    pub primary: String,

    /// Remote paths of copushed files
    pub extras: Vec<String>,

    /// Arguments forwarded to the program
    pub args: Vec<String>,

    /// Verbose mode
    pub verbose: bool,
}

impl InvocationSpec {
    /// Create a spec with no extras and no arguments
    pub fn new(kind: Kind, primary: impl Into<String>) -> Self {
        Self {
            kind,
            primary: primary.into(),
            extras: Vec::new(),
            args: Vec::new(),
            verbose: false,
        }
    }

    pub fn with_extra(mut self, remote_path: impl Into<String>) -> Self {
        self.extras.push(remote_path.into());
        self
    }

    pub fn with_extras<I, S>(mut self, remote_paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extras.extend(remote_paths.into_iter().map(Into::into));
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Every remote path owed a removal, primary first
    pub fn remote_paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.extras.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_remote_path_strips_directories() {
        let path = PathBuf::from("/home/dev/build/bin/hello");
        assert_eq!(
            remote_path_for("/data/local/tmp", &path).as_deref(),
            Some("/data/local/tmp/hello")
        );
        assert_eq!(
            remote_path_for("/data/local/tmp/", Path::new("libfoo.so")).as_deref(),
            Some("/data/local/tmp/libfoo.so")
        );
    }

    #[test]
    fn test_remote_path_without_file_name() {
        assert_eq!(remote_path_for("/data/local/tmp", Path::new("/")), None);
        assert_eq!(remote_path_for("/data/local/tmp", Path::new("a/..")), None);
    }

    #[test]
    fn test_session_collisions() {
        let mut session = RemoteSession::new();
        session.record("/data/local/tmp/a");
        session.record("/data/local/tmp/b");
        session.record("/data/local/tmp/a");
        session.record("/data/local/tmp/a");
        assert_eq!(session.len(), 4);
        assert_eq!(session.collisions(), vec!["/data/local/tmp/a"]);
    }

    #[test]
    fn test_spec_remote_paths() {
        let spec = InvocationSpec::new(Kind::NativeExecutable, "/data/local/tmp/app")
            .with_extras(["/data/local/tmp/libc++_shared.so"])
            .with_extra("/data/local/tmp/assets.bin");
        assert_eq!(
            spec.remote_paths().collect::<Vec<_>>(),
            vec![
                "/data/local/tmp/app",
                "/data/local/tmp/libc++_shared.so",
                "/data/local/tmp/assets.bin",
            ]
        );
        assert!(!spec.verbose);
        assert!(spec.with_verbose(true).verbose);
    }
}
