//! Remote command synthesis
//!
//! The remote invocation is modeled as a list of typed clauses and only
//! turned into shell text by [`RemoteCommand::to_args`]. All quoting lives in
//! this module.
//!
//! Rendered shape for an executable `app` with arguments `a b`:
//!
//! ```text
//! cd /data/local/tmp && chmod +x /data/local/tmp/app && echo '[program output]'
//!   && time sh -c 'LD_LIBRARY_PATH=/data/local/tmp /data/local/tmp/app a b
//!        && echo "[program execution completed]" || echo "[error code returned: ($?)]"'
//!   ; rm -f /data/local/tmp/app
//! ```

use std::borrow::Cow;

use tracing::debug;

use crate::artifact::Kind;
use crate::error::{Result, RunError};
use crate::session::InvocationSpec;

/// Printed right before the program starts
pub const OUTPUT_MARKER: &str = "[program output]";

/// Printed when the program exits with status zero
pub const SUCCESS_MARKER: &str = "[program execution completed]";

/// Printed when the program exits non-zero; `$?` is expanded remotely
pub const FAILURE_MARKER: &str = "[error code returned: ($?)]";

/// Library search path variable
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Class path variable read by `app_process`
pub const CLASSPATH_VAR: &str = "CLASSPATH";

/// Managed runtime bootstrap binary on the device
pub const APP_PROCESS: &str = "app_process";

/// Echo pair appended to the program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub success: String,
    pub failure: String,
}

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            success: SUCCESS_MARKER.to_string(),
            failure: FAILURE_MARKER.to_string(),
        }
    }
}

/// Timed program invocation run in its own shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSection {
    /// Environment assignments prefixed to the command
    pub env: Vec<(String, String)>,

    /// Program and its arguments
    pub argv: Vec<String>,

    /// Success/failure echo
    pub report: StatusReport,
}

/// One step of the remote command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `cd <dir>`
    ChangeDirectory(String),
    /// `chmod +x <path>`
    MakeExecutable(String),
    /// `echo <text>`
    Marker(String),
    /// `time sh -c '<env> <argv> && echo .. || echo ..'`
    Program(ProgramSection),
    /// `rm -f <path>`, independent of every other clause
    Remove(String),
}

impl Clause {
    /// Whether this clause belongs to the unconditional cleanup tail
    pub fn is_cleanup(&self) -> bool {
        matches!(self, Self::Remove(_))
    }

    fn render(&self) -> String {
        match self {
            Self::ChangeDirectory(dir) => format!("cd {}", quote(dir)),
            Self::MakeExecutable(path) => format!("chmod +x {}", quote(path)),
            Self::Marker(text) => format!("echo {}", quote(text)),
            Self::Program(section) => {
                let mut inner: Vec<String> = section
                    .env
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, quote(value)))
                    .collect();
                inner.extend(section.argv.iter().map(|arg| quote(arg).into_owned()));
                let script = format!(
                    "{} && echo {} || echo {}",
                    inner.join(" "),
                    double_quote(&section.report.success),
                    double_quote(&section.report.failure),
                );
                format!("time sh -c {}", single_quote(&script))
            }
            Self::Remove(path) => format!("rm -f {}", quote(path)),
        }
    }
}

/// A remote command ready to hand to the bridge's `shell` subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    clauses: Vec<Clause>,
}

impl RemoteCommand {
    /// Synthesize the clause list for `spec`.
    ///
    /// Archives need at least one forwarded argument naming the entry class.
    pub fn build(spec: &InvocationSpec, scratch_dir: &str) -> Result<Self> {
        let library_path = (LIBRARY_PATH_VAR.to_string(), scratch_dir.to_string());

        let (env, argv) = match spec.kind {
            Kind::NativeExecutable => {
                let mut argv = vec![spec.primary.clone()];
                argv.extend(spec.args.iter().cloned());
                (vec![library_path], argv)
            }
            Kind::ManagedArchive => {
                if spec.args.is_empty() {
                    return Err(RunError::NoEntryPointSpecified);
                }
                let mut argv = vec![APP_PROCESS.to_string(), "/".to_string()];
                argv.extend(spec.args.iter().cloned());
                let classpath = (CLASSPATH_VAR.to_string(), spec.primary.clone());
                (vec![library_path, classpath], argv)
            }
            Kind::Unknown => {
                return Err(RunError::NotExecutableOrArchive {
                    path: spec.primary.clone().into(),
                })
            }
        };

        let mut clauses = vec![Clause::ChangeDirectory(scratch_dir.to_string())];
        // Archives are read by app_process and never need the execute bit
        if spec.kind == Kind::NativeExecutable {
            clauses.push(Clause::MakeExecutable(spec.primary.clone()));
        }
        clauses.push(Clause::Marker(OUTPUT_MARKER.to_string()));
        clauses.push(Clause::Program(ProgramSection {
            env,
            argv,
            report: StatusReport::default(),
        }));
        clauses.extend(spec.remote_paths().map(|p| Clause::Remove(p.to_string())));

        debug!(kind = %spec.kind, clauses = clauses.len(), "built remote command");
        Ok(Self { clauses })
    }

    /// The clause list in execution order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Number of removal clauses
    pub fn cleanup_count(&self) -> usize {
        self.clauses.iter().filter(|c| c.is_cleanup()).count()
    }

    /// Render to shell arguments, one element per clause.
    ///
    /// Setup clauses are chained with `&&`; removals are separated with `;`
    /// so they run whatever happened before them.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let rendered = clause.render();
            if clause.is_cleanup() {
                args.push(format!("; {}", rendered));
            } else if args.is_empty() {
                args.push(rendered);
            } else {
                args.push(format!("&& {}", rendered));
            }
        }
        args
    }

    /// Full command line as the remote shell sees it
    pub fn render(&self) -> String {
        self.to_args().join(" ")
    }
}

fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '=' | ':' | ',' | '+' | '@' | '%')
}

/// Quote a token for a POSIX shell, leaving plain words bare
pub fn quote(token: &str) -> Cow<'_, str> {
    if !token.is_empty() && token.chars().all(is_shell_safe) {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(single_quote(token))
    }
}

fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

// Keeps `$` live so the remote shell expands it
fn double_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TMP: &str = "/data/local/tmp";

    fn native(args: &[&str]) -> InvocationSpec {
        InvocationSpec::new(Kind::NativeExecutable, "/data/local/tmp/app").with_args(args.to_vec())
    }

    #[test]
    fn test_native_clause_sequence() {
        let cmd = RemoteCommand::build(&native(&["hello"]), TMP).unwrap();
        let clauses = cmd.clauses();
        assert_eq!(clauses[0], Clause::ChangeDirectory(TMP.to_string()));
        assert_eq!(clauses[1], Clause::MakeExecutable("/data/local/tmp/app".to_string()));
        assert_eq!(clauses[2], Clause::Marker(OUTPUT_MARKER.to_string()));
        match &clauses[3] {
            Clause::Program(section) => {
                assert_eq!(section.env, vec![(LIBRARY_PATH_VAR.to_string(), TMP.to_string())]);
                assert_eq!(section.argv, vec!["/data/local/tmp/app", "hello"]);
            }
            other => panic!("expected program clause, got {:?}", other),
        }
        assert_eq!(clauses[4], Clause::Remove("/data/local/tmp/app".to_string()));
        assert_eq!(clauses.len(), 5);
    }

    #[test]
    fn test_native_rendering() {
        let args = RemoteCommand::build(&native(&["hello"]), TMP).unwrap().to_args();
        assert_eq!(
            args,
            vec![
                "cd /data/local/tmp".to_string(),
                "&& chmod +x /data/local/tmp/app".to_string(),
                "&& echo '[program output]'".to_string(),
                "&& time sh -c 'LD_LIBRARY_PATH=/data/local/tmp /data/local/tmp/app hello \
                 && echo \"[program execution completed]\" \
                 || echo \"[error code returned: ($?)]\"'"
                    .to_string(),
                "; rm -f /data/local/tmp/app".to_string(),
            ]
        );
    }

    #[test]
    fn test_forwarded_args_follow_program_in_order() {
        let rendered = RemoteCommand::build(&native(&["--flag", "x"]), TMP)
            .unwrap()
            .render();
        let invocation = rendered.find("/data/local/tmp/app --flag x").unwrap();
        let report = rendered.find("&& echo \"[program execution completed]\"").unwrap();
        assert!(invocation < report);
        assert_eq!(
            &rendered[invocation..report],
            "/data/local/tmp/app --flag x "
        );
    }

    #[test]
    fn test_native_without_args() {
        let rendered = RemoteCommand::build(&native(&[]), TMP).unwrap().render();
        assert!(rendered.contains("/data/local/tmp/app && echo \"[program execution completed]\""));
    }

    #[test]
    fn test_archive_requires_entry_point() {
        let spec = InvocationSpec::new(Kind::ManagedArchive, "/data/local/tmp/app.jar");
        let err = RemoteCommand::build(&spec, TMP).unwrap_err();
        assert!(matches!(err, RunError::NoEntryPointSpecified));
    }

    #[test]
    fn test_archive_launch() {
        let spec = InvocationSpec::new(Kind::ManagedArchive, "/data/local/tmp/app.jar")
            .with_args(["com.example.Main", "--port", "8080"]);
        let cmd = RemoteCommand::build(&spec, TMP).unwrap();
        assert!(!cmd
            .clauses()
            .iter()
            .any(|c| matches!(c, Clause::MakeExecutable(_))));

        let rendered = cmd.render();
        assert!(rendered.contains(
            "LD_LIBRARY_PATH=/data/local/tmp CLASSPATH=/data/local/tmp/app.jar \
             app_process / com.example.Main --port 8080 &&"
        ));
        assert!(rendered.ends_with("; rm -f /data/local/tmp/app.jar"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let spec = InvocationSpec::new(Kind::Unknown, "/data/local/tmp/notes.txt");
        let err = RemoteCommand::build(&spec, TMP).unwrap_err();
        assert!(matches!(err, RunError::NotExecutableOrArchive { .. }));
    }

    #[test]
    fn test_one_independent_removal_per_path() {
        let spec = native(&[])
            .with_extra("/data/local/tmp/libfoo.so")
            .with_extra("/data/local/tmp/config.json");
        let cmd = RemoteCommand::build(&spec, TMP).unwrap();
        assert_eq!(cmd.cleanup_count(), 3);

        let removals: Vec<String> = cmd
            .to_args()
            .into_iter()
            .filter(|a| a.contains("rm -f"))
            .collect();
        assert_eq!(
            removals,
            vec![
                "; rm -f /data/local/tmp/app",
                "; rm -f /data/local/tmp/libfoo.so",
                "; rm -f /data/local/tmp/config.json",
            ]
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain-word_1.0"), "plain-word_1.0");
        assert_eq!(quote("two words"), "'two words'");
        assert_eq!(quote(""), "''");
        assert_eq!(quote("$HOME"), "'$HOME'");
        assert_eq!(quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_args_quoted_twice_for_nested_shell() {
        let rendered = RemoteCommand::build(&native(&["a b", "it's"]), TMP)
            .unwrap()
            .render();
        // Inner shell sees 'a b' and 'it'\''s'; each ' is escaped again for the outer shell
        assert!(rendered.contains("/data/local/tmp/app '\\''a b'\\'' '\\''it'\\''\\'\\'''\\''s'\\''"));
    }

    #[test]
    fn test_double_quote_keeps_dollar() {
        assert_eq!(double_quote("($?)"), "\"($?)\"");
        assert_eq!(double_quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
