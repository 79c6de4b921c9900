use regex::Regex;
use tracing::debug;

use ranktab_exec::runner::CommandRunner;
use ranktab_types::config::SLOT_PLACEHOLDER;
use ranktab_types::host::HostAddress;

use crate::error::{BuildError, Result};

/// Pattern the device query's stdout is scanned with. The capture group is
/// the device's network address.
const ADDRESS_PATTERN: &str = r"ipaddr:(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})";

// ── DeviceEnumerator ──────────────────────────────────────────────────────────

/// Queries each device slot on a host for its network address, in slot
/// order.
///
/// A slot that cannot be queried, exits non-zero, or prints no address
/// aborts enumeration for the whole host: a partial device list would
/// silently corrupt downstream rank assignment, so it is never returned.
pub struct DeviceEnumerator {
    expected_count: u32,
    command_template: String,
    address_pattern: Regex,
}

impl DeviceEnumerator {
    pub fn new(expected_count: u32, command_template: &str) -> Self {
        Self {
            expected_count,
            command_template: command_template.to_string(),
            address_pattern: Regex::new(ADDRESS_PATTERN).expect("fixed pattern is valid"),
        }
    }

    /// Run the query for slots `0..expected_count` on `runner` and collect
    /// the addresses in slot order. Returns the complete list or the first
    /// failing slot.
    pub async fn enumerate<R>(&self, runner: &mut R, host: &HostAddress) -> Result<Vec<String>>
    where
        R: CommandRunner + ?Sized,
    {
        let mut addresses = Vec::with_capacity(self.expected_count as usize);

        for slot in 0..self.expected_count {
            let command = self
                .command_template
                .replace(SLOT_PLACEHOLDER, &slot.to_string());

            let output = runner.run(&command).await.map_err(|e| BuildError::Discovery {
                host: host.to_string(),
                slot,
                reason: format!("device query failed to run: {e:#}"),
            })?;

            if !output.succeeded() {
                let status = output.exit_status.unwrap_or_default();
                let stderr = output.stderr.trim();
                return Err(BuildError::Discovery {
                    host: host.to_string(),
                    slot,
                    reason: if stderr.is_empty() {
                        format!("device query exited with status {status}")
                    } else {
                        format!("device query exited with status {status}: {stderr}")
                    },
                });
            }

            let address = self
                .address_pattern
                .captures(&output.stdout)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| BuildError::Discovery {
                    host: host.to_string(),
                    slot,
                    reason: "no device address in query output".to_string(),
                })?;

            debug!(%host, slot, %address, "device address discovered");
            addresses.push(address);
        }

        Ok(addresses)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
