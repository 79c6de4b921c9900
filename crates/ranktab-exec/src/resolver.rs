//! Which of the requested hosts is the machine running this tool?
//!
//! The answer decides the execution mode per host: the matching host (if
//! any) is enumerated in-process, every other host over SSH. A failure to
//! enumerate local interfaces is deliberately not an error — it just means
//! every host is treated as remote.

use std::collections::HashSet;
use std::net::IpAddr;

use local_ip_address::list_afinet_netifas;
use tracing::{debug, warn};

use ranktab_types::host::HostAddress;

/// Resolve which requested host address, if any, is assigned to a local
/// network interface. Returns the first match in request order.
pub fn resolve_local_address(hosts: &[HostAddress]) -> Option<HostAddress> {
    let netifas = match list_afinet_netifas() {
        Ok(netifas) => netifas,
        Err(e) => {
            warn!(%e, "failed to enumerate local interface addresses — treating all hosts as remote");
            return None;
        }
    };
    debug!(interfaces = netifas.len(), "enumerated local interface addresses");
    match_local_address(netifas.into_iter().map(|(_name, addr)| addr), hosts)
}

/// Pure intersection step: the first host (in request order) whose address
/// is among `assigned`.
pub fn match_local_address(
    assigned: impl IntoIterator<Item = IpAddr>,
    hosts: &[HostAddress],
) -> Option<HostAddress> {
    let assigned: HashSet<String> =
        assigned.into_iter().map(|addr| addr.to_string()).collect();
    hosts.iter().find(|h| assigned.contains(h.as_str())).cloned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn hosts(addrs: &[&str]) -> Vec<HostAddress> {
        addrs.iter().map(|a| a.parse().unwrap()).collect()
    }

    fn assigned(addrs: &[[u8; 4]]) -> Vec<IpAddr> {
        addrs
            .iter()
            .map(|o| IpAddr::V4(Ipv4Addr::new(o[0], o[1], o[2], o[3])))
            .collect()
    }

    #[test]
    fn finds_the_local_host() {
        let local = match_local_address(
            assigned(&[[127, 0, 0, 1], [10, 0, 0, 2]]),
            &hosts(&["10.0.0.1", "10.0.0.2"]),
        );
        assert_eq!(local.unwrap().as_str(), "10.0.0.2");
    }

    #[test]
    fn no_intersection_means_none() {
        let local = match_local_address(
            assigned(&[[127, 0, 0, 1], [192, 168, 0, 5]]),
            &hosts(&["10.0.0.1", "10.0.0.2"]),
        );
        assert!(local.is_none());
    }

    #[test]
    fn request_order_wins_over_interface_order() {
        // Both requested hosts are assigned locally; the first requested one
        // is the answer regardless of interface enumeration order.
        let local = match_local_address(
            assigned(&[[10, 0, 0, 2], [10, 0, 0, 1]]),
            &hosts(&["10.0.0.1", "10.0.0.2"]),
        );
        assert_eq!(local.unwrap().as_str(), "10.0.0.1");
    }

    #[test]
    fn empty_host_list_matches_nothing() {
        assert!(match_local_address(assigned(&[[127, 0, 0, 1]]), &[]).is_none());
    }
}
