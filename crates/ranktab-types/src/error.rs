// Configuration-level errors. Every variant is detectable before any
// network activity and aborts the whole run.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid host address: {0}")]
    InvalidHostAddress(String),

    #[error("host list is empty")]
    EmptyHostList,

    #[error("username is empty")]
    EmptyUsername,

    #[error("password authentication selected but no password supplied")]
    MissingPassword,

    #[error("devices per host must be at least 1")]
    ZeroDeviceCount,

    #[error("device query command contains no \"{placeholder}\" placeholder")]
    MissingSlotPlaceholder { placeholder: &'static str },
}
