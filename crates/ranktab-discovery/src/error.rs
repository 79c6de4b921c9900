use ranktab_types::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("connection to {host} failed: {reason}")]
    Connection { host: String, reason: String },

    #[error("device discovery incomplete on {host} (slot {slot}): {reason}")]
    Discovery { host: String, slot: u32, reason: String },

    #[error("no host could be discovered — refusing to emit an empty rank table")]
    NoHostsDiscovered,

    #[error("invalid build transition: {from} → {to}")]
    InvalidTransition { from: String, to: String },
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, BuildError>;
