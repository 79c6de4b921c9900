use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── HostAddress ───────────────────────────────────────────────────────────────

/// A validated IPv4 dotted-quad host address.
///
/// The original input string is kept verbatim (so `010.0.0.1` stays
/// `010.0.0.1` in the emitted descriptor); validation only checks that the
/// string is four `.`-separated decimal octets, each in `[0, 255]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostAddress(String);

impl HostAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HostAddress {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets: Vec<&str> = s.split('.').collect();
        let valid = octets.len() == 4
            && octets
                .iter()
                .all(|o| !o.is_empty() && o.parse::<u8>().is_ok());
        if !valid {
            return Err(ConfigError::InvalidHostAddress(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
