use std::fmt;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use ranktab_exec::local::LocalRunner;
use ranktab_exec::runner::CommandRunner;
use ranktab_exec::ssh::SshSession;
use ranktab_exec::target::ExecutionTarget;
use ranktab_types::config::{Credentials, DiscoveryConfig};
use ranktab_types::host::HostAddress;

// ── ExecMode ──────────────────────────────────────────────────────────────────

/// How a host is reached, decided once per host from the resolved local
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Local,
    Remote,
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local  => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

// ── Connector ─────────────────────────────────────────────────────────────────

/// Produces an execution target for one host. The builder talks to this
/// seam only, so tests can substitute a scripted cluster.
#[async_trait]
pub trait Connector: Send + Sync {
    type Target: CommandRunner + Send;

    async fn open(&self, host: &HostAddress, mode: ExecMode) -> Result<Self::Target>;
}

// ── ClusterConnector ──────────────────────────────────────────────────────────

/// The production connector: in-process execution for the local host, one
/// authenticated SSH session per remote host.
pub struct ClusterConnector {
    credentials: Credentials,
    port: u16,
    strict_host_verification: bool,
    connect_timeout: Duration,
}

impl ClusterConnector {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            credentials: config.credentials.clone(),
            port: config.port,
            strict_host_verification: config.strict_host_verification,
            connect_timeout: config.connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for ClusterConnector {
    type Target = ExecutionTarget;

    async fn open(&self, host: &HostAddress, mode: ExecMode) -> Result<Self::Target> {
        match mode {
            ExecMode::Local => Ok(ExecutionTarget::Local(LocalRunner)),
            ExecMode::Remote => {
                let session = SshSession::connect(
                    host.as_str(),
                    self.port,
                    &self.credentials,
                    self.strict_host_verification,
                    self.connect_timeout,
                )
                .await?;
                Ok(ExecutionTarget::Remote(session))
            }
        }
    }
}
