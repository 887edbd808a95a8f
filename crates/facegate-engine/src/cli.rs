//! Subprocess adapter: `<executable> <entry-script> <sub-command> <args...>`
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use facegate_core::{EngineError, EngineInvocation, EngineOutcome, RecognitionEngine};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn, Instrument};

use crate::config::EngineConfig;

/// Runs the engine as a child process per invocation.
///
/// Paths are resolved once from [`EngineConfig`] at construction and the
/// child always runs with the project root as its working directory.
#[derive(Debug, Clone)]
pub struct CliEngine {
    executable: PathBuf,
    entry_script: PathBuf,
    project_root: PathBuf,
    limiter: Option<Arc<Semaphore>>,
}

impl CliEngine {
    pub fn new(config: EngineConfig) -> Self {
        let limiter = config
            .max_concurrent
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));

        Self {
            executable: config.resolved_executable(),
            entry_script: config.resolved_entry_script(),
            project_root: config.project_root,
            limiter,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn entry_script(&self) -> &Path {
        &self.entry_script
    }

    fn command(&self, invocation: &EngineInvocation) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(&self.entry_script)
            .arg(invocation.sub_command().as_str())
            .args(invocation.args())
            .current_dir(&self.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn command_line(&self, invocation: &EngineInvocation) -> String {
        let mut parts = vec![
            self.executable.display().to_string(),
            self.entry_script.display().to_string(),
            invocation.sub_command().as_str().to_string(),
        ];
        parts.extend(invocation.args().iter().cloned());
        parts.join(" ")
    }
}

#[async_trait]
impl RecognitionEngine for CliEngine {
    fn id(&self) -> &'static str {
        "cli"
    }

    async fn invoke(&self, invocation: EngineInvocation) -> Result<EngineOutcome, EngineError> {
        let permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| EngineError::Launch(format!("engine limiter closed: {}", e)))?,
            ),
            None => None,
        };

        let command_line = self.command_line(&invocation);
        let start = Instant::now();

        let mut child = self.command(&invocation).spawn().map_err(|e| {
            warn!(command = %command_line, error = %e, "Failed to launch engine");
            EngineError::Launch(format!("{}: {}", self.executable.display(), e))
        })?;

        // The child outlives a dropped caller, so the permit and the pipes
        // belong to a task that only finishes once the child has exited.
        let waiter = tokio::spawn(
            async move {
                let outcome = collect(&mut child).await;
                drop(permit);
                outcome
            }
            .in_current_span(),
        );
        let (status, outcome) = waiter
            .await
            .map_err(|e| EngineError::Io(format!("engine task failed: {}", e)))??;

        info!(
            command = %command_line,
            status = %status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Engine finished"
        );
        debug!(output = %outcome.output_text(), "Engine output");

        Ok(outcome)
    }
}

/// Drains stdout and stderr until the child exits.
async fn collect(child: &mut Child) -> Result<(ExitStatus, EngineOutcome), EngineError> {
    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| EngineError::Io("engine stdout not captured".to_string()))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| EngineError::Io("engine stderr not captured".to_string()))?;

    // Both pipes together, so neither can fill up and stall the child.
    let mut out_buf = Vec::new();
    let mut err_buf = Vec::new();
    let (out_read, err_read, status) = tokio::join!(
        stdout.read_to_end(&mut out_buf),
        stderr.read_to_end(&mut err_buf),
        child.wait(),
    );
    out_read.map_err(|e| EngineError::Io(format!("read engine stdout: {}", e)))?;
    err_read.map_err(|e| EngineError::Io(format!("read engine stderr: {}", e)))?;
    let status = status.map_err(|e| EngineError::Io(format!("wait for engine: {}", e)))?;

    out_buf.extend_from_slice(&err_buf);
    Ok((status, EngineOutcome::new(out_buf, status.success())))
}
