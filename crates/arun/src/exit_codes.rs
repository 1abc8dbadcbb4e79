//! Exit codes for the CLI

use arun_core::RunError;

/// General error
pub const ERROR: i32 = 1;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Exit code for an error returned by a command.
///
/// Run errors carry their own code; a failed remote shell mirrors the
/// bridge's exit status.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(run_error) = err.downcast_ref::<RunError>() {
        return run_error.exit_code();
    }
    if let Some(dialoguer::Error::IO(io)) = err.downcast_ref::<dialoguer::Error>() {
        if io.kind() == std::io::ErrorKind::Interrupted {
            return CANCELLED;
        }
    }
    ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_error_codes() {
        let err = anyhow::Error::new(RunError::ExecutionFailed {
            code: Some(3),
            reason: "adb shell returned exit status 3".to_string(),
        });
        assert_eq!(for_error(&err), 3);

        let err = anyhow::Error::new(RunError::NoEntryPointSpecified);
        assert_eq!(for_error(&err), 2);
    }

    #[test]
    fn test_other_errors() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(for_error(&err), ERROR);
    }

    #[test]
    fn test_context_keeps_run_error_code() {
        use anyhow::Context;
        let result: Result<(), RunError> = Err(RunError::TransferFailed {
            path: "app".into(),
            reason: "adb push returned exit status 1".to_string(),
        });
        let err = result.context("while deploying").unwrap_err();
        assert_eq!(for_error(&err), 5);
    }
}
