use crate::application::dto::DEFAULT_ADAPTER_TIMEOUT;
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Scoped runner for package-manager executables
///
/// Every child is spawned with `kill_on_drop`, so it is reaped when the
/// invocation completes, when the timeout elapses and when the owning task
/// is aborted.
#[derive(Debug, Clone, Copy)]
pub struct ToolRunner {
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Runs `program args...` in `cwd` and returns its stdout.
    ///
    /// # Returns
    /// `Ok(None)` when the executable is not installed.
    ///
    /// # Errors
    /// `SbomError::AdapterExecution` on spawn failure, non-zero exit,
    /// non-UTF-8 output or timeout.
    pub async fn run(
        &self,
        adapter: &str,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<Option<String>> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        tracing::debug!(adapter, program, ?args, "Running package manager");

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(adapter, program, "Executable not found");
                return Ok(None);
            }
            Err(e) => return Err(execution_error(adapter, format!("failed to spawn {}: {}", program, e))),
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|e| execution_error(adapter, format!("{}: {}", program, e)))?,
            Err(_) => {
                return Err(execution_error(
                    adapter,
                    format!("{} timed out after {:?}", program, self.timeout),
                ))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(execution_error(
                adapter,
                format!(
                    "{} {} exited with {}: {}",
                    program,
                    args.join(" "),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        String::from_utf8(output.stdout)
            .map(Some)
            .map_err(|e| execution_error(adapter, format!("{} produced non-UTF-8 output: {}", program, e)))
    }

    /// First line of `program --version`, for diagnostics
    pub async fn version(&self, adapter: &str, program: &str) -> Result<String> {
        self.version_with(adapter, program, &["--version"]).await
    }

    pub async fn version_with(&self, adapter: &str, program: &str, args: &[&str]) -> Result<String> {
        match self.run(adapter, program, args, None).await? {
            Some(stdout) => Ok(stdout.lines().next().unwrap_or_default().trim().to_string()),
            None => Err(execution_error(adapter, format!("{} is not installed", program))),
        }
    }
}

impl Default for ToolRunner {
    fn default() -> Self {
        Self::new(DEFAULT_ADAPTER_TIMEOUT)
    }
}

fn execution_error(adapter: &str, details: String) -> anyhow::Error {
    SbomError::AdapterExecution {
        adapter: adapter.to_string(),
        details,
    }
    .into()
}
