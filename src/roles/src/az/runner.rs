//! Subprocess execution for the Azure CLI
//!
//! Commands run with captured output and a hard timeout; the child is killed
//! when the timeout drops the future.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{Result, RoleError};

/// Executable names probed on `PATH`, in order
pub const CLI_CANDIDATES: [&str; 3] = ["az", "az.cmd", "az.exe"];

/// Bound on commands that wait for the operator
pub const INTERACTIVE_LIMIT: Duration = Duration::from_secs(600);

/// Captured result of one CLI invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Exit code zero
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs `az` subcommands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `az <args>` and capture its output
    ///
    /// A non-zero exit is returned as output, not as an error; errors mean
    /// the process could not be started or did not finish within `limit`.
    async fn run(&self, args: &[&str], limit: Duration) -> Result<CommandOutput>;

    /// Run `az <args>` attached to the terminal and return its exit code
    ///
    /// Used for commands that talk to the operator (`az login`). Runners
    /// without a terminal capture the output instead.
    async fn run_interactive(&self, args: &[&str]) -> Result<Option<i32>> {
        Ok(self.run(args, INTERACTIVE_LIMIT).await?.status)
    }

    /// First line of `az --version`
    async fn version(&self, limit: Duration) -> Result<String> {
        let output = self.run(&["--version"], limit).await?;
        if !output.success() {
            return Err(RoleError::CliUnavailable(format!(
                "az --version failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string())
    }

    /// Executable being invoked, for status reporting
    fn program(&self) -> &Path;
}

/// [`CommandRunner`] backed by a real `az` executable
#[derive(Debug, Clone)]
pub struct AzCommandRunner {
    program: PathBuf,
}

impl AzCommandRunner {
    /// Use an explicit executable path
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate the executable (see [`locate_cli`])
    pub fn discover(configured: Option<&Path>) -> Result<Self> {
        locate_cli(configured).map(Self::new)
    }
}

#[async_trait]
impl CommandRunner for AzCommandRunner {
    async fn run(&self, args: &[&str], limit: Duration) -> Result<CommandOutput> {
        debug!("Running {} {}", self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RoleError::CliUnavailable(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let output = timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| {
                RoleError::CliUnavailable(format!(
                    "az {} timed out after {}s",
                    args.first().copied().unwrap_or_default(),
                    limit.as_secs()
                ))
            })??;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_interactive(&self, args: &[&str]) -> Result<Option<i32>> {
        debug!("Running {} {} interactively", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RoleError::CliUnavailable(format!(
                    "failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let status = timeout(INTERACTIVE_LIMIT, child.wait())
            .await
            .map_err(|_| {
                RoleError::CliUnavailable(format!(
                    "az {} timed out after {}s",
                    args.first().copied().unwrap_or_default(),
                    INTERACTIVE_LIMIT.as_secs()
                ))
            })??;

        Ok(status.code())
    }

    fn program(&self) -> &Path {
        &self.program
    }
}

/// Finds the Azure CLI executable
///
/// An explicitly configured path wins when it exists; otherwise each `PATH`
/// directory is probed for [`CLI_CANDIDATES`].
pub fn locate_cli(configured: Option<&Path>) -> Result<PathBuf> {
    locate_cli_in(configured, std::env::var_os("PATH"))
}

/// [`locate_cli`] against an explicit `PATH` value
pub fn locate_cli_in(configured: Option<&Path>, path_var: Option<OsString>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(RoleError::CliUnavailable(format!(
            "configured CLI path does not exist: {}",
            path.display()
        )));
    }

    let path_var = path_var.unwrap_or_default();
    for dir in std::env::split_paths(&path_var) {
        for candidate in CLI_CANDIDATES {
            let path = dir.join(candidate);
            if path.is_file() {
                debug!("Found Azure CLI at {}", path.display());
                return Ok(path);
            }
        }
    }

    Err(RoleError::CliUnavailable(
        "az executable not found on PATH".to_string(),
    ))
}
