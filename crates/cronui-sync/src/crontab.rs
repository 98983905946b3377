//! `CrontabGateway`: reads and installs the current user's table by shelling
//! out to the system `crontab` tool.

use std::{
    ffi::OsStr,
    io::Write,
    path::{Path, PathBuf},
    process::{Output, Stdio},
    time::Duration,
};

use async_trait::async_trait;
use cronui_core::config::CrontabConfig;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, warn};

use crate::{
    error::{Result, SyncError},
    gateway::TableGateway,
};

/// `crontab -l` prints this (prefixed by the user name) when nothing is installed.
const NO_CRONTAB_MARKER: &str = "no crontab for";

/// Gateway backed by the `crontab` command line tool.
#[derive(Debug, Clone)]
pub struct CrontabGateway {
    program: String,
    timeout: Duration,
    staging_dir: Option<PathBuf>,
}

impl CrontabGateway {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
            staging_dir: None,
        }
    }

    pub fn from_config(config: &CrontabConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            staging_dir: config.staging_dir.as_ref().map(PathBuf::from),
        }
    }

    /// Write staging files under `dir` instead of the OS temp dir.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Run `program args…` with the configured timeout.
    ///
    /// The child is killed if the deadline passes.
    async fn run(&self, args: &[&OsStr]) -> Result<Output> {
        debug!(program = %self.program, ?args, "running crontab");

        let mut command = AsyncCommand::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => {
                warn!(program = %self.program, "crontab timed out");
                Err(SyncError::Timeout {
                    ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    fn stage(&self, raw: &[u8]) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("cronui-");
        let mut file = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(raw)?;
        file.flush()?;
        Ok(file)
    }
}

#[async_trait]
impl TableGateway for CrontabGateway {
    async fn read(&self) -> Result<Vec<u8>> {
        let output = self
            .run(&[OsStr::new("-l")])
            .await
            .map_err(|e| match e {
                SyncError::Io(e) => SyncError::GatewayRead(format!("spawn failed: {e}")),
                other => other,
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains(NO_CRONTAB_MARKER) {
            debug!("no crontab installed yet");
            return Err(SyncError::NoTable);
        }
        Err(SyncError::GatewayRead(failure_message(&output)))
    }

    async fn write(&self, raw: &[u8]) -> Result<()> {
        let staged = self
            .stage(raw)
            .map_err(|e| SyncError::GatewayWrite(format!("staging failed: {e}")))?;
        let path: &Path = staged.path();
        info!(path = %path.display(), bytes = raw.len(), "writing temp crontab");

        let output = self
            .run(&[path.as_os_str()])
            .await
            .map_err(|e| match e {
                SyncError::Io(e) => SyncError::GatewayWrite(format!("spawn failed: {e}")),
                other => other,
            })?;

        // `staged` drops (and is deleted) when this returns, on every path.
        if output.status.success() {
            Ok(())
        } else {
            Err(SyncError::GatewayWrite(failure_message(&output)))
        }
    }
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let code = output
        .status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string());
    if stderr.is_empty() {
        format!("exit status {code}")
    } else {
        format!("exit status {code}: {stderr}")
    }
}
