// Rank-table descriptor, in the exact wire shape downstream runtimes load:
// every count and id is rendered as a decimal string, and field order within
// each object matches the established format.

use serde::{Deserialize, Serialize};

use crate::host::HostAddress;

/// Format version tag emitted in every descriptor.
pub const TABLE_VERSION: &str = "1.0";

/// Status tag for a fully assembled descriptor. No other status is ever
/// written: an incomplete build produces no descriptor at all.
pub const STATUS_COMPLETED: &str = "completed";

// ── DeviceEntry ───────────────────────────────────────────────────────────────

/// One accelerator device: its slot on the host, its discovered network
/// address, and its globally unique rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub device_id: String,
    pub device_ip: String,
    pub rank_id: String,
}

impl DeviceEntry {
    pub fn new(slot: u32, device_ip: String, rank: u32) -> Self {
        Self {
            device_id: slot.to_string(),
            device_ip,
            rank_id: rank.to_string(),
        }
    }
}

// ── ServerEntry ───────────────────────────────────────────────────────────────

/// One host and its ordered device list. `container_ip` duplicates
/// `server_id`; consumers running inside containers read the former.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    pub device: Vec<DeviceEntry>,
    pub server_id: String,
    pub container_ip: String,
}

impl ServerEntry {
    pub fn new(host: &HostAddress, device: Vec<DeviceEntry>) -> Self {
        Self {
            device,
            server_id: host.to_string(),
            container_ip: host.to_string(),
        }
    }
}

// ── RankTable ─────────────────────────────────────────────────────────────────

/// The root descriptor. `server_count` counts the hosts actually present in
/// `server_list`, which under a skip-and-continue build may be fewer than
/// were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankTable {
    pub server_count: String,
    pub server_list: Vec<ServerEntry>,
    pub status: String,
    pub version: String,
}

impl RankTable {
    /// Assemble a completed table from populated server entries.
    pub fn completed(server_list: Vec<ServerEntry>) -> Self {
        Self {
            server_count: server_list.len().to_string(),
            server_list,
            status: STATUS_COMPLETED.to_string(),
            version: TABLE_VERSION.to_string(),
        }
    }

    /// Total number of rank entries across all hosts.
    pub fn total_ranks(&self) -> usize {
        self.server_list.iter().map(|s| s.device.len()).sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
