// src/build/command.rs

//! Shell-command build runner.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::build::{BuildRunner, BuildVerdict};
use crate::errors::{Result, WadError};

/// Runs `cmd` through the platform shell in `dir` and waits for it.
///
/// Output is consumed line by line and logged at `debug`, so the pipes never
/// fill up and the console stays reserved for status lines.
#[derive(Debug, Clone)]
pub struct CommandBuildRunner {
    cmd: String,
    dir: PathBuf,
}

impl CommandBuildRunner {
    pub fn new(cmd: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            dir: dir.into(),
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }

    async fn run(&self) -> Result<BuildVerdict> {
        debug!(cmd = %self.cmd, dir = ?self.dir, "starting build process");

        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        cmd.current_dir(&self.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            WadError::BuildInvocation(format!("spawning `{}` in {:?}: {e}", self.cmd, self.dir))
        })?;

        let stdout = child.stdout.take().map(|s| drain_lines(s, "stdout"));
        let stderr = child.stderr.take().map(|s| drain_lines(s, "stderr"));

        let status = child.wait().await.map_err(|e| {
            WadError::BuildInvocation(format!("waiting for `{}`: {e}", self.cmd))
        })?;

        for drain in [stdout, stderr].into_iter().flatten() {
            let _ = drain.await;
        }

        let exit_code = status.code().unwrap_or(-1);
        info!(exit_code, success = status.success(), "build process exited");
        Ok(BuildVerdict { exit_code })
    }
}

impl BuildRunner for CommandBuildRunner {
    fn build(&mut self) -> Pin<Box<dyn Future<Output = Result<BuildVerdict>> + Send + '_>> {
        Box::pin(self.run())
    }
}

fn drain_lines<R>(reader: R, stream: &'static str) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(stream, "build: {}", line);
        }
    })
}
