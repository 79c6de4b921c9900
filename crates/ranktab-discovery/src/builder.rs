//! The build driver.
//!
//! Algorithm:
//! 1. Validate the configuration (no network activity yet).
//! 2. Resolve the local address once; it is reused for every host.
//! 3. Per host, in input order: pick the execution mode, open a target,
//!    enumerate every device slot, close the target on every exit path.
//! 4. Apply the configured failure policy to host-scoped errors.
//! 5. Assign ranks in a single pure pass over the collected lists.
//!
//! No partial table ever escapes: the caller gets a complete
//! [`RankTable`] or a [`BuildError`].

use tracing::{debug, info, warn};

use ranktab_exec::resolver::resolve_local_address;
use ranktab_exec::runner::CommandRunner;
use ranktab_types::config::{DiscoveryConfig, FailurePolicy};
use ranktab_types::host::HostAddress;
use ranktab_types::table::RankTable;

use crate::connector::{ClusterConnector, Connector, ExecMode};
use crate::enumerator::DeviceEnumerator;
use crate::error::{BuildError, Result};
use crate::progress::DiscoveryRun;
use crate::ranker::assign_ranks;

// ── RankTableBuilder ──────────────────────────────────────────────────────────

pub struct RankTableBuilder<C: Connector> {
    config: DiscoveryConfig,
    connector: C,
    enumerator: DeviceEnumerator,
}

impl RankTableBuilder<ClusterConnector> {
    /// Build against the real cluster described by `config`.
    pub fn from_config(config: DiscoveryConfig) -> Result<Self> {
        let connector = ClusterConnector::new(&config);
        Self::with_connector(config, connector)
    }
}

impl<C: Connector> RankTableBuilder<C> {
    /// Build through an explicit connector. Rejects invalid configuration
    /// before any session could be opened.
    pub fn with_connector(config: DiscoveryConfig, connector: C) -> Result<Self> {
        config.validate()?;
        let enumerator =
            DeviceEnumerator::new(config.devices_per_host, &config.device_query_command);
        Ok(Self { config, connector, enumerator })
    }

    /// Run the full discovery pass and assemble the table.
    pub async fn build(&self) -> Result<RankTable> {
        let local = resolve_local_address(&self.config.hosts);
        match &local {
            Some(addr) => info!(%addr, "requested host matches a local interface address"),
            None => debug!("no requested host is local — all hosts will be reached over SSH"),
        }
        self.build_with_local(local).await
    }

    /// Like [`Self::build`], with the local-resolution result supplied by
    /// the caller.
    pub async fn build_with_local(&self, local: Option<HostAddress>) -> Result<RankTable> {
        let mut run = DiscoveryRun::new(self.config.hosts.len());
        run.start()?;
        run.local_resolved(local)?;

        let mut discovered: Vec<(HostAddress, Vec<String>)> = Vec::new();

        for host in &self.config.hosts {
            let mode = if run.local_address.as_ref() == Some(host) {
                ExecMode::Local
            } else {
                ExecMode::Remote
            };
            info!(%host, %mode, "discovering host");

            match self.discover_host(host, mode).await {
                Ok(devices) => {
                    info!(%host, devices = devices.len(), "host enumerated");
                    run.host_discovered(host.clone())?;
                    discovered.push((host.clone(), devices));
                }
                Err(e) => {
                    warn!(%host, %e, "host discovery failed");
                    run.host_failed(host.clone(), e.to_string())?;
                    match self.config.failure_policy {
                        FailurePolicy::AbortAll => {
                            run.fail(&e.to_string());
                            return Err(e);
                        }
                        FailurePolicy::SkipAndContinue => continue,
                    }
                }
            }
        }

        if discovered.is_empty() {
            run.fail("no host could be discovered");
            return Err(BuildError::NoHostsDiscovered);
        }

        let table = assign_ranks(&discovered);
        run.assembled()?;
        info!(
            servers = table.server_list.len(),
            ranks = table.total_ranks(),
            skipped = run.failed.len(),
            "rank table assembled"
        );
        Ok(table)
    }

    /// Connect to one host, enumerate its devices, and release the target
    /// whether enumeration succeeded or not.
    async fn discover_host(&self, host: &HostAddress, mode: ExecMode) -> Result<Vec<String>> {
        let mut target =
            self.connector
                .open(host, mode)
                .await
                .map_err(|e| BuildError::Connection {
                    host: host.to_string(),
                    reason: format!("{e:#}"),
                })?;

        let result = self.enumerator.enumerate(&mut target, host).await;

        if let Err(e) = target.close().await {
            warn!(%host, %e, "session teardown failed");
        }
        result
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
