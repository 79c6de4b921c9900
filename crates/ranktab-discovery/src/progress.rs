use std::fmt;

use ranktab_types::host::HostAddress;

use crate::error::{BuildError, Result};

// ── Build State Machine ───────────────────────────────────────────────────────

/// Idle → ResolvingLocal → Discovering → Assembled | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    /// Nothing has happened yet.
    Idle,
    /// Determining which requested host, if any, is the local machine.
    ResolvingLocal,
    /// Iterating hosts: connect, enumerate, record the outcome.
    Discovering,
    /// Every recorded host contributed a complete device list; a table
    /// exists.
    Assembled,
    /// The build was abandoned; no table is ever produced from this state.
    Failed,
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle           => write!(f, "Idle"),
            Self::ResolvingLocal => write!(f, "ResolvingLocal"),
            Self::Discovering    => write!(f, "Discovering"),
            Self::Assembled      => write!(f, "Assembled"),
            Self::Failed         => write!(f, "Failed"),
        }
    }
}

// ── Discovery Run ─────────────────────────────────────────────────────────────

/// Tracks one build from start to terminal state: the current phase, the
/// resolved local address, and the per-host outcomes. Transition methods
/// reject calls made in the wrong phase, so a builder bug surfaces as an
/// [`BuildError::InvalidTransition`] instead of a corrupt table.
#[derive(Debug)]
pub struct DiscoveryRun {
    pub phase: BuildPhase,
    pub requested_hosts: usize,
    pub local_address: Option<HostAddress>,
    pub discovered: Vec<HostAddress>,
    pub failed: Vec<(HostAddress, String)>,
    pub failure_reason: Option<String>,
}

impl DiscoveryRun {
    pub fn new(requested_hosts: usize) -> Self {
        Self {
            phase: BuildPhase::Idle,
            requested_hosts,
            local_address: None,
            discovered: Vec::new(),
            failed: Vec::new(),
            failure_reason: None,
        }
    }

    fn transition(&mut self, expected: BuildPhase, next: BuildPhase) -> Result<()> {
        if self.phase != expected {
            return Err(BuildError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// `Idle → ResolvingLocal`.
    pub fn start(&mut self) -> Result<()> {
        self.transition(BuildPhase::Idle, BuildPhase::ResolvingLocal)
    }

    /// Record the local-resolution result. `ResolvingLocal → Discovering`.
    pub fn local_resolved(&mut self, local: Option<HostAddress>) -> Result<()> {
        self.transition(BuildPhase::ResolvingLocal, BuildPhase::Discovering)?;
        self.local_address = local;
        Ok(())
    }

    /// Record a host that contributed its complete device list.
    pub fn host_discovered(&mut self, host: HostAddress) -> Result<()> {
        if self.phase != BuildPhase::Discovering {
            return Err(BuildError::InvalidTransition {
                from: self.phase.to_string(),
                to: "recording discovered host".to_string(),
            });
        }
        self.discovered.push(host);
        Ok(())
    }

    /// Record a host that failed to connect or enumerate.
    pub fn host_failed(&mut self, host: HostAddress, reason: String) -> Result<()> {
        if self.phase != BuildPhase::Discovering {
            return Err(BuildError::InvalidTransition {
                from: self.phase.to_string(),
                to: "recording failed host".to_string(),
            });
        }
        self.failed.push((host, reason));
        Ok(())
    }

    /// `Discovering → Assembled`. Requires at least one discovered host.
    pub fn assembled(&mut self) -> Result<()> {
        if self.discovered.is_empty() {
            return Err(BuildError::NoHostsDiscovered);
        }
        self.transition(BuildPhase::Discovering, BuildPhase::Assembled)
    }

    /// Abandon the build with a reason. Valid from any non-terminal phase.
    pub fn fail(&mut self, reason: &str) {
        self.phase = BuildPhase::Failed;
        self.failure_reason = Some(reason.to_string());
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, BuildPhase::Assembled | BuildPhase::Failed)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn host(s: &str) -> HostAddress {
        s.parse().unwrap()
    }

    #[test]
    fn state_machine_happy_path() {
        let mut run = DiscoveryRun::new(2);
        assert_eq!(run.phase, BuildPhase::Idle);

        run.start().unwrap();
        assert_eq!(run.phase, BuildPhase::ResolvingLocal);

        run.local_resolved(Some(host("10.0.0.1"))).unwrap();
        assert_eq!(run.phase, BuildPhase::Discovering);

        run.host_discovered(host("10.0.0.1")).unwrap();
        run.host_discovered(host("10.0.0.2")).unwrap();

        run.assembled().unwrap();
        assert_eq!(run.phase, BuildPhase::Assembled);
        assert!(run.is_terminal());
        assert_eq!(run.discovered.len(), 2);
    }

    #[test]
    fn invalid_transitions_reject() {
        let mut run = DiscoveryRun::new(1);
        // Cannot record outcomes before discovery starts.
        assert!(run.host_discovered(host("10.0.0.1")).is_err());
        assert!(run.local_resolved(None).is_err());
        // Cannot start twice.
        run.start().unwrap();
        assert!(run.start().is_err());
    }

    #[test]
    fn assembling_with_no_hosts_rejects() {
        let mut run = DiscoveryRun::new(1);
        run.start().unwrap();
        run.local_resolved(None).unwrap();
        run.host_failed(host("10.0.0.1"), "unreachable".into()).unwrap();
        assert!(matches!(run.assembled(), Err(BuildError::NoHostsDiscovered)));
    }

    #[test]
    fn fail_records_reason_from_any_phase() {
        let mut run = DiscoveryRun::new(1);
        run.fail("host 10.0.0.1 unreachable");
        assert_eq!(run.phase, BuildPhase::Failed);
        assert!(run.is_terminal());
        assert_eq!(
            run.failure_reason.as_deref(),
            Some("host 10.0.0.1 unreachable")
        );
    }

    #[test]
    fn mixed_outcomes_are_both_recorded() {
        let mut run = DiscoveryRun::new(2);
        run.start().unwrap();
        run.local_resolved(None).unwrap();
        run.host_discovered(host("10.0.0.1")).unwrap();
        run.host_failed(host("10.0.0.2"), "auth rejected".into()).unwrap();
        run.assembled().unwrap();
        assert_eq!(run.discovered.len(), 1);
        assert_eq!(run.failed.len(), 1);
    }
}
