// Discovery configuration. Every knob the engine consults lives here;
// nothing is hardcoded at the point of use.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::host::HostAddress;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Default number of accelerator devices expected on every host.
pub const DEFAULT_DEVICES_PER_HOST: u32 = 8;

/// Placeholder substituted with the device slot index when rendering
/// [`DiscoveryConfig::device_query_command`].
pub const SLOT_PLACEHOLDER: &str = "{slot}";

/// Default per-slot device address query.
pub const DEFAULT_DEVICE_QUERY: &str = "hccn_tool -i {slot} -ip -g";

/// Default bound on SSH session establishment.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ── Credentials ───────────────────────────────────────────────────────────────

/// How to authenticate against a remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Private-key authentication. `None` probes the conventional key paths
    /// under `~/.ssh`.
    Key { path: Option<PathBuf> },
    /// Password authentication. An empty password is a configuration error,
    /// rejected before any connection is attempted.
    Password { password: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub auth: AuthMethod,
}

// ── Failure policy ────────────────────────────────────────────────────────────

/// What to do when a single host cannot be connected to or enumerated.
/// Applied uniformly to connection and discovery failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing host and fail the whole build.
    #[default]
    AbortAll,
    /// Log the failure, omit the host from the table, continue. The build
    /// still fails if no host succeeds.
    SkipAndContinue,
}

// ── DiscoveryConfig ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Hosts to discover, in rank-assignment order.
    pub hosts: Vec<HostAddress>,
    pub credentials: Credentials,
    pub port: u16,
    /// Uniform device count expected on every host.
    pub devices_per_host: u32,
    /// Per-slot query command template; must contain [`SLOT_PLACEHOLDER`].
    pub device_query_command: String,
    pub failure_policy: FailurePolicy,
    /// Off (default): accept unknown server host keys automatically, as the
    /// original tooling does. On: require a `known_hosts` match.
    pub strict_host_verification: bool,
    pub connect_timeout: Duration,
}

impl DiscoveryConfig {
    pub fn new(hosts: Vec<HostAddress>, credentials: Credentials) -> Self {
        Self {
            hosts,
            credentials,
            port: DEFAULT_SSH_PORT,
            devices_per_host: DEFAULT_DEVICES_PER_HOST,
            device_query_command: DEFAULT_DEVICE_QUERY.to_string(),
            failure_policy: FailurePolicy::default(),
            strict_host_verification: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Reject configurations that could never produce a valid table.
    /// Runs before any session is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::EmptyHostList);
        }
        if self.credentials.username.is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        if let AuthMethod::Password { password } = &self.credentials.auth {
            if password.is_empty() {
                return Err(ConfigError::MissingPassword);
            }
        }
        if self.devices_per_host == 0 {
            return Err(ConfigError::ZeroDeviceCount);
        }
        if !self.device_query_command.contains(SLOT_PLACEHOLDER) {
            return Err(ConfigError::MissingSlotPlaceholder {
                placeholder: SLOT_PLACEHOLDER,
            });
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> DiscoveryConfig {
        DiscoveryConfig::new(
            vec!["10.0.0.1".parse().unwrap()],
            Credentials {
                username: "root".into(),
                auth: AuthMethod::Password { password: "secret".into() },
            },
        )
    }

    #[test]
    fn defaults() {
        let cfg = base_config();
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.devices_per_host, 8);
        assert_eq!(cfg.failure_policy, FailurePolicy::AbortAll);
        assert!(!cfg.strict_host_verification);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(30));
        assert!(cfg.device_query_command.contains(SLOT_PLACEHOLDER));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_host_list_rejected() {
        let mut cfg = base_config();
        cfg.hosts.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyHostList));
    }

    #[test]
    fn empty_password_rejected() {
        let mut cfg = base_config();
        cfg.credentials.auth = AuthMethod::Password { password: String::new() };
        assert_eq!(cfg.validate(), Err(ConfigError::MissingPassword));
    }

    #[test]
    fn key_auth_needs_no_password() {
        let mut cfg = base_config();
        cfg.credentials.auth = AuthMethod::Key { path: None };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_devices_rejected() {
        let mut cfg = base_config();
        cfg.devices_per_host = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDeviceCount));
    }

    #[test]
    fn template_without_placeholder_rejected() {
        let mut cfg = base_config();
        cfg.device_query_command = "hccn_tool -i 0 -ip -g".into();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MissingSlotPlaceholder { .. })
        ));
    }
}
