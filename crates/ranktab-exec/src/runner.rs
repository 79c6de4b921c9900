use anyhow::Result;
use async_trait::async_trait;

// ── CommandOutput ─────────────────────────────────────────────────────────────

/// Captured result of one shell command on one host.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status if the command ran to completion and reported one.
    /// Remote channels may close without a status; that is not an error.
    pub exit_status: Option<u32>,
}

impl CommandOutput {
    pub fn succeeded(&self) -> bool {
        matches!(self.exit_status, Some(0) | None)
    }
}

// ── CommandRunner ─────────────────────────────────────────────────────────────

/// Something that can run a shell command on a host and hand back its output.
///
/// Implemented by [`crate::LocalRunner`], [`crate::SshSession`], and the
/// [`crate::ExecutionTarget`] wrapper; tests substitute scripted mocks.
#[async_trait]
pub trait CommandRunner: Send {
    /// Run `command` to completion and capture its output. An error means
    /// the command could not be run at all, not that it exited non-zero.
    async fn run(&mut self, command: &str) -> Result<CommandOutput>;

    /// Release any underlying session. Must be safe to call on every exit
    /// path, including after a failed `run`.
    async fn close(&mut self) -> Result<()>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_accepts_zero_and_missing_status() {
        assert!(CommandOutput { exit_status: Some(0), ..Default::default() }.succeeded());
        assert!(CommandOutput { exit_status: None, ..Default::default() }.succeeded());
        assert!(!CommandOutput { exit_status: Some(2), ..Default::default() }.succeeded());
    }
}
