use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::debug;

use crate::error::CapshotError;

/// Captured output of a completed command, decoded as UTF-8 and trimmed.
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

/// Execution options for [`run`]. The parent environment is always inherited;
/// `envs` adds to it.
#[derive(Debug, Default)]
pub(crate) struct RunOptions {
    pub(crate) current_dir: Option<PathBuf>,
    pub(crate) envs: Vec<(String, String)>,
}

/// Run a command to completion and capture both output streams.
///
/// A non-zero exit is an error carrying the command name and the exit code,
/// or the terminating signal when there is no code. There is no timeout; the
/// caller decides how long it is willing to wait.
pub(crate) async fn run(
    program: &str,
    args: &[&str],
    options: RunOptions,
) -> Result<CommandOutput, CapshotError> {
    debug!(command = program, ?args, "running external command");
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in &options.envs {
        command.env(key, value);
    }
    if let Some(dir) = &options.current_dir {
        command.current_dir(dir);
    }
    let output = command.output().await?;
    if !output.status.success() {
        return Err(CapshotError::Process {
            command: program.to_string(),
            status: describe_exit(output.status),
        });
    }
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

fn describe_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => describe_signal(status),
    }
}

#[cfg(unix)]
fn describe_signal(status: ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(signal) => format!("signal {signal}"),
        None => "an unknown signal".to_string(),
    }
}

#[cfg(not(unix))]
fn describe_signal(_status: ExitStatus) -> String {
    "an unknown signal".to_string()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn captures_both_streams_trimmed() {
        let output = run(
            "/bin/sh",
            &["-c", "echo for stdout; echo for stderr 1>&2"],
            RunOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(output.stdout, "for stdout");
        assert_eq!(output.stderr, "for stderr");
    }

    #[tokio::test]
    async fn reports_exit_code_on_failure() {
        let error = run("/bin/sh", &["-c", "exit 3"], RunOptions::default())
            .await
            .unwrap_err();
        assert_matches!(
            &error,
            CapshotError::Process { command, status } if command == "/bin/sh" && status == "3"
        );
        assert_eq!(error.to_string(), "/bin/sh failed with 3");
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let error = run(
            "/definitely/not/a/real/binary",
            &[],
            RunOptions::default(),
        )
        .await
        .unwrap_err();
        assert_matches!(error, CapshotError::IO(_));
    }

    #[tokio::test]
    async fn honors_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        let output = run(
            "/bin/sh",
            &["-c", "pwd"],
            RunOptions {
                current_dir: Some(dir.path().to_path_buf()),
                ..RunOptions::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(PathBuf::from(output.stdout), expected);
    }

    #[tokio::test]
    async fn extends_the_environment() {
        let output = run(
            "/bin/sh",
            &["-c", "printf '%s' \"$CAPSHOT_TEST_MARKER\""],
            RunOptions {
                envs: vec![("CAPSHOT_TEST_MARKER".to_string(), "present".to_string())],
                ..RunOptions::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(output.stdout, "present");
    }
}
