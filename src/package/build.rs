//! External build invocation.
//!
//! The build is delegated to an external tool (`sam build` by default) run
//! through a shell. [`BuildCommand`] composes the command line,
//! [`BuildExecutor`] runs it, and [`build`] maps any failure into a
//! downstream error.

use crate::error::{PluginError, Result};
use crate::reporter::Reporter;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use super::tool_detection::build_tool_available;
use super::{BUILD_TOOL, HANDLER_FUNCTION};

/// Option appended when the build should run inside a container.
pub const CONTAINER_FLAG: &str = "--use-container";

/// Shell used to run the build command.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Fully composed build command line.
///
/// Built once and handed to a [`BuildExecutor`] by value; it has no mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    line: String,
    overridden: bool,
}

impl BuildCommand {
    /// Composes the build command for the project rooted at `base_dir`.
    ///
    /// `override_command` replaces `sam build --build-dir {base}/build`
    /// verbatim. The container flag (if requested) and the handler function
    /// name are appended in either case.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfn_typescript_plugin::package::BuildCommand;
    ///
    /// let cmd = BuildCommand::new("/p".as_ref(), None, true);
    /// assert_eq!(cmd.as_str(), "sam build --build-dir /p/build --use-container TypeFunction");
    ///
    /// let cmd = BuildCommand::new("/p".as_ref(), Some("npm run build"), false);
    /// assert_eq!(cmd.as_str(), "npm run build TypeFunction");
    /// ```
    pub fn new(base_dir: &Path, override_command: Option<&str>, use_container: bool) -> Self {
        let mut line = match override_command {
            Some(command) => command.to_string(),
            None => format!("{BUILD_TOOL} build --build-dir {}/build", base_dir.display()),
        };
        if use_container {
            line.push(' ');
            line.push_str(CONTAINER_FLAG);
        }
        line.push(' ');
        line.push_str(HANDLER_FUNCTION);

        Self {
            line,
            overridden: override_command.is_some(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// True when the command came from project configuration rather than the default.
    pub fn is_overridden(&self) -> bool {
        self.overridden
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Captured result of a finished build process.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// A build process ran but exited unsuccessfully.
#[derive(Debug, thiserror::Error)]
#[error("build command `{command}` exited with {status}: {stderr}")]
pub struct BuildFailure {
    pub command: String,
    pub status: ExitStatus,
    pub stderr: String,
}

/// Capability that runs a composed build command.
///
/// Implementations return `Ok` for any process that ran to completion,
/// whatever its exit status; `Err` means the process could not be started
/// or waited on.
pub trait BuildExecutor {
    fn execute(
        &self,
        command: BuildCommand,
        working_dir: &Path,
    ) -> impl Future<Output = std::io::Result<BuildOutput>> + Send;
}

/// Runs build commands as `<shell> -c '<command>'`.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: PathBuf,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

impl ShellExecutor {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &Path {
        &self.shell
    }
}

impl BuildExecutor for ShellExecutor {
    fn execute(
        &self,
        command: BuildCommand,
        working_dir: &Path,
    ) -> impl Future<Output = std::io::Result<BuildOutput>> + Send {
        let mut process = tokio::process::Command::new(&self.shell);
        process
            .arg("-c")
            .arg(command.as_str())
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        async move {
            let output = process.output().await?;
            Ok(BuildOutput {
                status: output.status,
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
    }
}

/// Runs the external build for the project rooted at `base_dir`.
///
/// Blocks (asynchronously) until the build tool exits; there is no timeout.
///
/// # Errors
///
/// Returns [`PluginError::Downstream`] if the shell cannot be started or
/// the build exits unsuccessfully. The spawn error or a [`BuildFailure`]
/// is chained as the source.
pub async fn build<E: BuildExecutor>(
    executor: &E,
    base_dir: &Path,
    override_command: Option<&str>,
    use_container: bool,
    reporter: &Reporter,
) -> Result<BuildOutput> {
    reporter.debug(format_args!(
        "Dependencies build started from '{}'",
        base_dir.display()
    ));

    let command = BuildCommand::new(base_dir, override_command, use_container);
    reporter.debug(format_args!("command is '{command}'"));

    if !command.is_overridden() && !build_tool_available(reporter) {
        reporter.warn(format_args!(
            "'{BUILD_TOOL}' was not found on PATH; the build will likely fail"
        ));
    }

    reporter.warn(format_args!("Starting build."));
    let line = command.as_str().to_string();
    let output = executor
        .execute(command, base_dir)
        .await
        .map_err(|e| PluginError::downstream("local build failed", e))?;

    if !output.status.success() {
        return Err(PluginError::downstream(
            "local build failed",
            BuildFailure {
                command: line,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            },
        ));
    }

    reporter.debug(format_args!(
        "--- build stdout:\n{}",
        String::from_utf8_lossy(&output.stdout)
    ));
    reporter.debug(format_args!(
        "--- build stderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    ));
    reporter.debug(format_args!("Dependencies build finished"));

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::MemorySink;
    use std::error::Error as _;
    use tempfile::TempDir;

    #[test]
    fn default_command_without_container() {
        let cmd = BuildCommand::new(Path::new("/work/proj"), None, false);
        assert_eq!(cmd.as_str(), "sam build --build-dir /work/proj/build TypeFunction");
        assert!(!cmd.is_overridden());
    }

    #[test]
    fn default_command_with_container() {
        let cmd = BuildCommand::new(Path::new("/work/proj"), None, true);
        assert_eq!(
            cmd.to_string(),
            "sam build --build-dir /work/proj/build --use-container TypeFunction"
        );
    }

    #[test]
    fn override_keeps_container_flag_and_handler() {
        let cmd = BuildCommand::new(Path::new("/work/proj"), Some("./custom-build.sh"), true);
        assert_eq!(cmd.as_str(), "./custom-build.sh --use-container TypeFunction");
        assert!(cmd.is_overridden());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_executor_captures_output() {
        let dir = TempDir::new().unwrap();
        let executor = ShellExecutor::new("/bin/sh");
        let cmd = BuildCommand::new(dir.path(), Some("echo built; echo oops >&2; echo"), false);

        let output = executor.execute(cmd, dir.path()).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "built\nTypeFunction\n");
        assert_eq!(String::from_utf8_lossy(&output.stderr), "oops\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shell_executor_runs_in_working_dir() {
        let dir = TempDir::new().unwrap();
        let executor = ShellExecutor::new("/bin/sh");
        let cmd = BuildCommand::new(dir.path(), Some("touch marker; echo"), false);

        executor.execute(cmd, dir.path()).await.unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_downstream_error() {
        let dir = TempDir::new().unwrap();
        let sink = MemorySink::new();
        let reporter = Reporter::new(sink.clone());

        let err = build(
            &ShellExecutor::new("/bin/sh"),
            dir.path(),
            Some("echo failing >&2; false"),
            false,
            &reporter,
        )
        .await
        .unwrap_err();

        assert!(err.is_downstream());
        assert_eq!(err.to_string(), "local build failed");
        let source = err.source().unwrap().to_string();
        assert!(source.contains("failing"), "{source}");
        assert!(sink.contains("Starting build."));
    }

    #[tokio::test]
    async fn missing_shell_is_downstream_error() {
        let dir = TempDir::new().unwrap();
        let err = build(
            &ShellExecutor::new(dir.path().join("no-such-shell")),
            dir.path(),
            Some("true"),
            false,
            &Reporter::new(MemorySink::new()),
        )
        .await
        .unwrap_err();

        assert!(err.is_downstream());
        let source = err.source().unwrap().downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_build_logs_output() {
        let dir = TempDir::new().unwrap();
        let sink = MemorySink::new();

        let output = build(
            &ShellExecutor::new("/bin/sh"),
            dir.path(),
            Some("echo compiled"),
            false,
            &Reporter::new(sink.clone()),
        )
        .await
        .unwrap();

        assert!(output.status.success());
        assert!(sink.contains("compiled TypeFunction"));
        assert!(sink.contains("Dependencies build finished"));
    }
}
