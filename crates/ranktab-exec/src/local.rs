use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::runner::{CommandOutput, CommandRunner};

// ── LocalRunner ───────────────────────────────────────────────────────────────

/// Runs commands on the machine executing the tool, through `sh -c` so the
/// query template may use ordinary shell syntax. Stateless; there is no
/// session to establish or release.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

#[async_trait]
impl CommandRunner for LocalRunner {
    async fn run(&mut self, command: &str) -> Result<CommandOutput> {
        debug!(%command, "running local command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .with_context(|| format!("failed to spawn local command: {command}"))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_status: output.status.code().map(|c| c as u32),
        })
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_status() {
        let mut runner = LocalRunner;
        let out = runner.run("echo ipaddr:1.2.3.4").await.unwrap();
        assert_eq!(out.stdout.trim(), "ipaddr:1.2.3.4");
        assert_eq!(out.exit_status, Some(0));
        assert!(out.succeeded());
    }

    #[tokio::test]
    async fn reports_non_zero_exit_without_erroring() {
        let mut runner = LocalRunner;
        let out = runner.run("exit 3").await.unwrap();
        assert_eq!(out.exit_status, Some(3));
        assert!(!out.succeeded());
    }

    #[tokio::test]
    async fn captures_stderr() {
        let mut runner = LocalRunner;
        let out = runner.run("echo oops >&2").await.unwrap();
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn close_is_a_no_op() {
        let mut runner = LocalRunner;
        assert!(runner.close().await.is_ok());
    }
}
