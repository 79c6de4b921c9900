use anyhow::Result;
use async_trait::async_trait;

use crate::local::LocalRunner;
use crate::runner::{CommandOutput, CommandRunner};
use crate::ssh::SshSession;

// ── ExecutionTarget ───────────────────────────────────────────────────────────

/// How commands reach one particular host. Produced once per host by the
/// connector; the `Remote` variant owns the session for that host's
/// lifetime and releases it on [`CommandRunner::close`].
pub enum ExecutionTarget {
    /// The host is the machine running the tool.
    Local(LocalRunner),
    /// The host is a remote peer reached over an authenticated session.
    Remote(SshSession),
}

#[async_trait]
impl CommandRunner for ExecutionTarget {
    async fn run(&mut self, command: &str) -> Result<CommandOutput> {
        match self {
            Self::Local(runner) => runner.run(command).await,
            Self::Remote(session) => session.run(command).await,
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self {
            Self::Local(runner) => runner.close().await,
            Self::Remote(session) => session.close().await,
        }
    }
}
