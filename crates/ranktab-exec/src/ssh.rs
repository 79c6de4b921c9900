use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use russh::client;
use russh::{ChannelMsg, Disconnect};
use russh_keys::key;
use tracing::{debug, warn};

use ranktab_types::config::{AuthMethod, Credentials};

use crate::runner::{CommandOutput, CommandRunner};

/// Conventional private-key locations probed when key auth is requested
/// without an explicit path, most preferred first.
const DEFAULT_KEY_PATHS: &[&str] = &["~/.ssh/id_ed25519", "~/.ssh/id_rsa"];

// ── Host-key policy ───────────────────────────────────────────────────────────

/// Server host-key callback for the client session.
///
/// Permissive mode (`strict: false`) accepts any key the server presents —
/// the established behavior of this tooling on closed cluster networks.
/// Strict mode requires a matching `known_hosts` entry.
struct ClientHandler {
    host: String,
    port: u16,
    strict: bool,
}

#[async_trait]
impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &key::PublicKey,
    ) -> Result<bool, Self::Error> {
        if !self.strict {
            debug!(host = %self.host, "accepting server host key without verification");
            return Ok(true);
        }
        match russh_keys::check_known_hosts(&self.host, self.port, server_public_key) {
            Ok(true) => Ok(true),
            Ok(false) => {
                warn!(host = %self.host, "server host key not found in known_hosts");
                Ok(false)
            }
            Err(e) => {
                warn!(host = %self.host, %e, "known_hosts check failed");
                Ok(false)
            }
        }
    }
}

// ── SshSession ────────────────────────────────────────────────────────────────

/// One authenticated SSH session to one host.
///
/// Opened lazily by the connector when a host turns out to be remote, used
/// for every device query on that host, and released when the host's
/// enumeration finishes or fails.
pub struct SshSession {
    handle: client::Handle<ClientHandler>,
    host: String,
}

impl SshSession {
    /// Establish and authenticate a session.
    ///
    /// Session establishment is bounded by `connect_timeout`. Key auth with
    /// an explicit path fails before any network attempt if the key file
    /// does not exist.
    pub async fn connect(
        host: &str,
        port: u16,
        credentials: &Credentials,
        strict_host_verification: bool,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let config = Arc::new(client::Config::default());
        let handler = ClientHandler {
            host: host.to_string(),
            port,
            strict: strict_host_verification,
        };

        debug!(%host, port, "opening SSH session");
        let mut handle = tokio::time::timeout(
            connect_timeout,
            client::connect(config, (host, port), handler),
        )
        .await
        .map_err(|_| {
            anyhow!("connection timed out after {}s", connect_timeout.as_secs())
        })?
        .with_context(|| format!("failed to connect to {host}:{port}"))?;

        let username = credentials.username.as_str();
        let authenticated = match &credentials.auth {
            AuthMethod::Key { path } => {
                let key_path = resolve_key_path(path.as_ref())?;
                let key_pair = russh_keys::load_secret_key(&key_path, None)
                    .with_context(|| {
                        format!("failed to load private key {}", key_path.display())
                    })?;
                handle
                    .authenticate_publickey(username, Arc::new(key_pair))
                    .await
                    .context("public key authentication failed")?
            }
            AuthMethod::Password { password } => handle
                .authenticate_password(username, password.as_str())
                .await
                .context("password authentication failed")?,
        };

        if !authenticated {
            bail!("authentication rejected for {username}@{host}");
        }

        Ok(Self { handle, host: host.to_string() })
    }
}

#[async_trait]
impl CommandRunner for SshSession {
    /// Run one command over a fresh session channel and collect its output
    /// until the channel closes.
    async fn run(&mut self, command: &str) -> Result<CommandOutput> {
        debug!(host = %self.host, %command, "running remote command");
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .with_context(|| format!("failed to open channel to {}", self.host))?;
        channel
            .exec(true, command)
            .await
            .with_context(|| format!("failed to execute command on {}", self.host))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext: 1 } => {
                    stderr.extend_from_slice(data)
                }
                ChannelMsg::ExitStatus { exit_status: status } => {
                    exit_status = Some(status)
                }
                _ => {}
            }
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        })
    }

    async fn close(&mut self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .with_context(|| format!("failed to disconnect from {}", self.host))
    }
}

// ── Key path resolution ───────────────────────────────────────────────────────

/// Resolve the private key to use: the explicit path if given (must exist),
/// otherwise the first existing conventional key under `~/.ssh`.
fn resolve_key_path(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let expanded = expand_home(path);
        if !expanded.exists() {
            bail!("SSH key file does not exist: {}", expanded.display());
        }
        return Ok(expanded);
    }

    DEFAULT_KEY_PATHS
        .iter()
        .map(|p| expand_home(&PathBuf::from(p)))
        .find(|p| p.exists())
        .ok_or_else(|| {
            anyhow!("no private key found at any of: {}", DEFAULT_KEY_PATHS.join(", "))
        })
}

/// Expand a leading `~/` against `$HOME`. Paths without the prefix (or with
/// no `HOME` set) pass through untouched.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_home_rewrites_tilde_prefix() {
        std::env::set_var("HOME", "/home/tester");
        let expanded = expand_home(&PathBuf::from("~/.ssh/id_rsa"));
        assert_eq!(expanded, PathBuf::from("/home/tester/.ssh/id_rsa"));
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        let path = PathBuf::from("/keys/id_rsa");
        assert_eq!(expand_home(&path), path);
    }

    #[test]
    fn explicit_missing_key_is_rejected() {
        let missing = PathBuf::from("/nonexistent/id_rsa");
        let err = resolve_key_path(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn explicit_existing_key_is_used() {
        let dir = std::env::temp_dir().join("ranktab-key-test");
        std::fs::create_dir_all(&dir).unwrap();
        let key = dir.join("id_test");
        std::fs::write(&key, "not really a key").unwrap();
        assert_eq!(resolve_key_path(Some(&key)).unwrap(), key);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
