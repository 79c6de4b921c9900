//! Rank assignment: the second, pure pass over collected device lists.
//!
//! Ranks are a single contiguous range `[0, total_device_count)` assigned
//! host-by-host in input order, slot-by-slot ascending within a host. The
//! accumulator is threaded explicitly through the fold, so the result is a
//! function of the input alone — discovery order, timing, and any future
//! parallelism cannot influence it.

use ranktab_types::host::HostAddress;
use ranktab_types::table::{DeviceEntry, RankTable, ServerEntry};

/// Assemble a completed rank table from per-host device address lists.
///
/// `discovered` carries one entry per successfully enumerated host, in the
/// original request order, each with its complete slot-ordered address list.
pub fn assign_ranks(discovered: &[(HostAddress, Vec<String>)]) -> RankTable {
    let mut servers = Vec::with_capacity(discovered.len());
    let mut next_rank: u32 = 0;

    for (host, device_addresses) in discovered {
        let mut devices = Vec::with_capacity(device_addresses.len());
        for (slot, address) in device_addresses.iter().enumerate() {
            devices.push(DeviceEntry::new(slot as u32, address.clone(), next_rank));
            next_rank += 1;
        }
        servers.push(ServerEntry::new(host, devices));
    }

    RankTable::completed(servers)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn discovered(hosts: &[(&str, &[&str])]) -> Vec<(HostAddress, Vec<String>)> {
        hosts
            .iter()
            .map(|(h, devs)| {
                (
                    h.parse().unwrap(),
                    devs.iter().map(|d| d.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn ranks_are_contiguous_and_unique() {
        let input = discovered(&[
            ("10.0.0.1", &["192.168.1.1", "192.168.1.2", "192.168.1.3"]),
            ("10.0.0.2", &["192.168.2.1", "192.168.2.2", "192.168.2.3"]),
            ("10.0.0.3", &["192.168.3.1", "192.168.3.2", "192.168.3.3"]),
        ]);
        let table = assign_ranks(&input);

        let ranks: Vec<u32> = table
            .server_list
            .iter()
            .flat_map(|s| s.device.iter())
            .map(|d| d.rank_id.parse().unwrap())
            .collect();

        assert_eq!(ranks.len(), 9);
        assert_eq!(ranks.iter().copied().collect::<HashSet<_>>().len(), 9);
        // Host-major, slot-minor order means the flattened sequence is
        // exactly 0..9 in order.
        assert_eq!(ranks, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn host_order_is_input_order() {
        let input = discovered(&[
            ("10.0.0.2", &["192.168.2.1"]),
            ("10.0.0.1", &["192.168.1.1"]),
        ]);
        let table = assign_ranks(&input);
        assert_eq!(table.server_list[0].server_id, "10.0.0.2");
        assert_eq!(table.server_list[1].server_id, "10.0.0.1");
        assert_eq!(table.server_list[0].device[0].rank_id, "0");
        assert_eq!(table.server_list[1].device[0].rank_id, "1");
    }

    #[test]
    fn slots_are_contiguous_from_zero_per_host() {
        let input = discovered(&[("10.0.0.1", &["192.168.1.1", "192.168.1.2"])]);
        let table = assign_ranks(&input);
        let ids: Vec<&str> = table.server_list[0]
            .device
            .iter()
            .map(|d| d.device_id.as_str())
            .collect();
        assert_eq!(ids, vec!["0", "1"]);
    }

    #[test]
    fn ranks_continue_across_hosts() {
        let input = discovered(&[
            ("10.0.0.1", &["192.168.1.1", "192.168.1.2"]),
            ("10.0.0.2", &["192.168.2.1", "192.168.2.2"]),
        ]);
        let table = assign_ranks(&input);
        assert_eq!(table.server_list[1].device[0].rank_id, "2");
        assert_eq!(table.server_list[1].device[1].rank_id, "3");
    }

    #[test]
    fn deterministic_for_identical_input() {
        let input = discovered(&[
            ("10.0.0.1", &["192.168.1.1", "192.168.1.2"]),
            ("10.0.0.2", &["192.168.2.1", "192.168.2.2"]),
        ]);
        assert_eq!(assign_ranks(&input), assign_ranks(&input));
    }

    #[test]
    fn server_count_tracks_populated_hosts() {
        let input = discovered(&[("10.0.0.2", &["192.168.2.1"])]);
        let table = assign_ranks(&input);
        assert_eq!(table.server_count, "1");
        assert_eq!(table.total_ranks(), 1);
    }
}
