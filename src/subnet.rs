//! Subnet model: membership and the intra-subnet weighted graph.
//!
//! A subnet owns its member systems and a symmetric weighted adjacency
//! over them, and answers single-source shortest-path queries restricted
//! to its own edges. Edge weights are strictly positive; the adjacency is
//! kept symmetric by construction.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::net::Ipv4Addr;

use log::debug;
use serde::Serialize;

use crate::addr;
use crate::error::NetworkError;
use crate::system::NetworkSystem;

/// A contiguous IPv4 range holding one router and zero or more hosts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subnet {
    base: Ipv4Addr,
    prefix_len: u8,
    /// Members in insertion order; `list systems` reports this order
    systems: Vec<NetworkSystem>,
    edges: HashMap<Ipv4Addr, HashMap<Ipv4Addr, u32>>,
}

impl Subnet {
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Self {
        Self {
            base,
            prefix_len,
            systems: Vec::new(),
            edges: HashMap::new(),
        }
    }

    pub fn base(&self) -> Ipv4Addr {
        self.base
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// CIDR form, e.g. `192.168.1.0/24`
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.base, self.prefix_len)
    }

    /// Broadcast (last) address of the range
    pub fn last_address(&self) -> Ipv4Addr {
        addr::last_address(self.base, self.prefix_len)
    }

    /// True when `address` falls inside this subnet's range
    pub fn contains_address(&self, address: Ipv4Addr) -> bool {
        addr::contains(self.base, self.prefix_len, address)
    }

    pub fn systems(&self) -> &[NetworkSystem] {
        &self.systems
    }

    pub fn system(&self, address: Ipv4Addr) -> Option<&NetworkSystem> {
        self.systems.iter().find(|s| s.address == address)
    }

    /// Address of the subnet's router, if one has been added
    pub fn router_address(&self) -> Option<Ipv4Addr> {
        self.systems.iter().find(|s| s.is_router()).map(|s| s.address)
    }

    /// Weight of the edge between `a` and `b`, if present
    pub fn edge_weight(&self, a: Ipv4Addr, b: Ipv4Addr) -> Option<u32> {
        self.edges.get(&a).and_then(|neighbors| neighbors.get(&b)).copied()
    }

    /// Add a member system.
    ///
    /// The address must lie inside the subnet range and be new to this
    /// subnet; at most one member may carry the Router role.
    pub fn add_system(&mut self, system: NetworkSystem) -> Result<(), NetworkError> {
        if !self.contains_address(system.address) {
            return Err(NetworkError::AddressOutOfRange {
                addr: system.address,
                base: self.base,
                prefix_len: self.prefix_len,
            });
        }
        if self.system(system.address).is_some() {
            return Err(NetworkError::DuplicateAddress(system.address));
        }
        if system.is_router() && self.router_address().is_some() {
            return Err(NetworkError::DuplicateRouter(self.base));
        }

        debug!("subnet {}: added system {}", self.cidr(), system.address);
        self.systems.push(system);
        Ok(())
    }

    /// Remove a host member and every edge referencing it.
    ///
    /// Routers cannot be removed; the subnet would lose its gateway.
    pub fn remove_system(&mut self, address: Ipv4Addr) -> Result<(), NetworkError> {
        let position = self
            .systems
            .iter()
            .position(|s| s.address == address)
            .ok_or(NetworkError::SystemNotFound(address))?;
        if self.systems[position].is_router() {
            return Err(NetworkError::RouterRemovalDenied(address));
        }

        self.systems.remove(position);
        if let Some(neighbors) = self.edges.remove(&address) {
            for neighbor in neighbors.keys() {
                if let Some(reverse) = self.edges.get_mut(neighbor) {
                    reverse.remove(&address);
                    if reverse.is_empty() {
                        self.edges.remove(neighbor);
                    }
                }
            }
        }
        debug!("subnet {}: removed system {}", self.cidr(), address);
        Ok(())
    }

    /// Insert a symmetric weighted edge between two members.
    ///
    /// Fails without mutating if either endpoint is absent, the edge
    /// already exists, or the weight is not strictly positive.
    pub fn add_connection(&mut self, a: Ipv4Addr, b: Ipv4Addr, weight: u32) -> Result<(), NetworkError> {
        if self.system(a).is_none() {
            return Err(NetworkError::SystemNotFound(a));
        }
        if self.system(b).is_none() {
            return Err(NetworkError::SystemNotFound(b));
        }
        if a == b || self.edge_weight(a, b).is_some() {
            return Err(NetworkError::DuplicateConnection { a, b });
        }
        if weight == 0 {
            return Err(NetworkError::InvalidWeight(0));
        }

        self.edges.entry(a).or_default().insert(b, weight);
        self.edges.entry(b).or_default().insert(a, weight);
        debug!("subnet {}: connected {} <--> {} weight {}", self.cidr(), a, b, weight);
        Ok(())
    }

    /// Remove the edge between two members, both directions.
    pub fn remove_connection(&mut self, a: Ipv4Addr, b: Ipv4Addr) -> Result<(), NetworkError> {
        if self.edge_weight(a, b).is_none() {
            return Err(NetworkError::ConnectionNotFound { a, b });
        }

        for (from, to) in [(a, b), (b, a)] {
            if let Some(neighbors) = self.edges.get_mut(&from) {
                neighbors.remove(&to);
                if neighbors.is_empty() {
                    self.edges.remove(&from);
                }
            }
        }
        debug!("subnet {}: disconnected {} <--> {}", self.cidr(), a, b);
        Ok(())
    }

    /// Shortest path between two members by summed edge weight.
    ///
    /// Dijkstra restricted to this subnet's edges. Equal-distance frontier
    /// entries are ordered by the smaller numeric address, so the selected
    /// path is deterministic. Returns `None` when either endpoint is not a
    /// member or the destination is unreachable.
    pub fn shortest_path(&self, from: Ipv4Addr, to: Ipv4Addr) -> Option<Vec<Ipv4Addr>> {
        let mut dist: HashMap<Ipv4Addr, u32> =
            self.systems.iter().map(|s| (s.address, u32::MAX)).collect();
        if !dist.contains_key(&from) || !dist.contains_key(&to) {
            return None;
        }

        let mut previous: HashMap<Ipv4Addr, Ipv4Addr> = HashMap::new();
        let mut heap = BinaryHeap::new();
        dist.insert(from, 0);
        heap.push(Frontier { dist: 0, node: from });

        while let Some(Frontier { dist: d, node }) = heap.pop() {
            // Skip entries superseded by a later relaxation
            if d > *dist.get(&node).unwrap_or(&u32::MAX) {
                continue;
            }
            if node == to {
                break;
            }

            let Some(neighbors) = self.edges.get(&node) else {
                continue;
            };
            for (&next, &weight) in neighbors {
                let candidate = d.saturating_add(weight);
                if candidate < *dist.get(&next).unwrap_or(&u32::MAX) {
                    dist.insert(next, candidate);
                    previous.insert(next, node);
                    heap.push(Frontier { dist: candidate, node: next });
                }
            }
        }

        let mut path = vec![to];
        let mut current = to;
        while let Some(&prev) = previous.get(&current) {
            path.push(prev);
            current = prev;
        }
        path.reverse();

        if path.len() == 1 && from != to {
            return None;
        }
        Some(path)
    }
}

/// Frontier entry for the intra-subnet search
#[derive(Debug, Eq, PartialEq)]
struct Frontier {
    dist: u32,
    node: Ipv4Addr,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap; equal distances fall back to the
        // smaller numeric address
        other
            .dist
            .cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    /// The example subnet: router .1, hosts .2 through .6
    fn example_subnet() -> Subnet {
        let mut subnet = Subnet::new(ip("192.168.1.0"), 24);
        subnet.add_system(NetworkSystem::router(ip("192.168.1.1"))).unwrap();
        for host in 2..=6 {
            subnet
                .add_system(NetworkSystem::host(Ipv4Addr::new(192, 168, 1, host)))
                .unwrap();
        }
        for (a, b, w) in [
            ("192.168.1.1", "192.168.1.2", 2),
            ("192.168.1.1", "192.168.1.4", 10),
            ("192.168.1.2", "192.168.1.3", 3),
            ("192.168.1.4", "192.168.1.2", 9),
            ("192.168.1.2", "192.168.1.5", 5),
            ("192.168.1.1", "192.168.1.5", 7),
            ("192.168.1.2", "192.168.1.6", 1),
        ] {
            subnet.add_connection(ip(a), ip(b), w).unwrap();
        }
        subnet
    }

    #[test]
    fn test_add_system_out_of_range() {
        let mut subnet = Subnet::new(ip("192.168.1.0"), 24);
        let result = subnet.add_system(NetworkSystem::host(ip("192.168.2.1")));
        assert!(matches!(result, Err(NetworkError::AddressOutOfRange { .. })));
        assert!(subnet.systems().is_empty());
    }

    #[test]
    fn test_second_router_rejected() {
        let mut subnet = Subnet::new(ip("10.0.0.0"), 16);
        subnet.add_system(NetworkSystem::router(ip("10.0.0.1"))).unwrap();
        let result = subnet.add_system(NetworkSystem::router(ip("10.0.0.2")));
        assert_eq!(result, Err(NetworkError::DuplicateRouter(ip("10.0.0.0"))));
        assert_eq!(subnet.systems().len(), 1);
    }

    #[test]
    fn test_connection_symmetry() {
        let subnet = example_subnet();
        assert_eq!(subnet.edge_weight(ip("192.168.1.1"), ip("192.168.1.2")), Some(2));
        assert_eq!(subnet.edge_weight(ip("192.168.1.2"), ip("192.168.1.1")), Some(2));
    }

    #[test]
    fn test_duplicate_connection_rejected() {
        let mut subnet = example_subnet();
        let result = subnet.add_connection(ip("192.168.1.2"), ip("192.168.1.1"), 4);
        assert!(matches!(result, Err(NetworkError::DuplicateConnection { .. })));
        // weight unchanged in both directions
        assert_eq!(subnet.edge_weight(ip("192.168.1.1"), ip("192.168.1.2")), Some(2));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let mut subnet = example_subnet();
        let result = subnet.add_connection(ip("192.168.1.3"), ip("192.168.1.4"), 0);
        assert_eq!(result, Err(NetworkError::InvalidWeight(0)));
        assert_eq!(subnet.edge_weight(ip("192.168.1.3"), ip("192.168.1.4")), None);
    }

    #[test]
    fn test_connection_to_missing_system() {
        let mut subnet = example_subnet();
        let result = subnet.add_connection(ip("192.168.1.2"), ip("192.168.1.99"), 1);
        assert_eq!(result, Err(NetworkError::SystemNotFound(ip("192.168.1.99"))));
    }

    #[test]
    fn test_remove_missing_connection() {
        let mut subnet = example_subnet();
        let result = subnet.remove_connection(ip("192.168.1.3"), ip("192.168.1.6"));
        assert!(matches!(result, Err(NetworkError::ConnectionNotFound { .. })));
    }

    #[test]
    fn test_remove_connection_both_directions() {
        let mut subnet = example_subnet();
        subnet.remove_connection(ip("192.168.1.2"), ip("192.168.1.6")).unwrap();
        assert_eq!(subnet.edge_weight(ip("192.168.1.2"), ip("192.168.1.6")), None);
        assert_eq!(subnet.edge_weight(ip("192.168.1.6"), ip("192.168.1.2")), None);
    }

    #[test]
    fn test_remove_router_denied() {
        let mut subnet = example_subnet();
        let result = subnet.remove_system(ip("192.168.1.1"));
        assert_eq!(result, Err(NetworkError::RouterRemovalDenied(ip("192.168.1.1"))));
        assert_eq!(subnet.systems().len(), 6);
    }

    #[test]
    fn test_remove_system_prunes_edges() {
        let mut subnet = example_subnet();
        subnet.remove_system(ip("192.168.1.2")).unwrap();
        assert_eq!(subnet.edge_weight(ip("192.168.1.1"), ip("192.168.1.2")), None);
        assert_eq!(subnet.edge_weight(ip("192.168.1.3"), ip("192.168.1.2")), None);
        // .3 and .6 connected only through .2, now fully disconnected
        assert_eq!(subnet.shortest_path(ip("192.168.1.3"), ip("192.168.1.1")), None);
    }

    #[test]
    fn test_shortest_path_direct_edge_wins() {
        let subnet = example_subnet();
        let path = subnet.shortest_path(ip("192.168.1.2"), ip("192.168.1.6")).unwrap();
        assert_eq!(path, vec![ip("192.168.1.2"), ip("192.168.1.6")]);
    }

    #[test]
    fn test_shortest_path_multi_hop() {
        let subnet = example_subnet();
        // .3 -> .5 must go through .2: 3 + 5 = 8, cheaper than any detour
        let path = subnet.shortest_path(ip("192.168.1.3"), ip("192.168.1.5")).unwrap();
        assert_eq!(path, vec![ip("192.168.1.3"), ip("192.168.1.2"), ip("192.168.1.5")]);
    }

    #[test]
    fn test_shortest_path_weighted_detour() {
        let subnet = example_subnet();
        // .1 -> .4 direct costs 10, but .1 -> .2 -> .4 costs 2 + 9 = 11
        let path = subnet.shortest_path(ip("192.168.1.1"), ip("192.168.1.4")).unwrap();
        assert_eq!(path, vec![ip("192.168.1.1"), ip("192.168.1.4")]);
    }

    #[test]
    fn test_shortest_path_source_equals_destination() {
        let subnet = example_subnet();
        let path = subnet.shortest_path(ip("192.168.1.3"), ip("192.168.1.3")).unwrap();
        assert_eq!(path, vec![ip("192.168.1.3")]);
    }

    #[test]
    fn test_shortest_path_unreachable() {
        let mut subnet = Subnet::new(ip("10.0.0.0"), 24);
        subnet.add_system(NetworkSystem::router(ip("10.0.0.1"))).unwrap();
        subnet.add_system(NetworkSystem::host(ip("10.0.0.2"))).unwrap();
        assert_eq!(subnet.shortest_path(ip("10.0.0.1"), ip("10.0.0.2")), None);
    }

    #[test]
    fn test_shortest_path_optimality_brute_force() {
        // Verify Dijkstra against exhaustive enumeration on the example graph
        let subnet = example_subnet();
        let members: Vec<Ipv4Addr> = subnet.systems().iter().map(|s| s.address).collect();

        fn enumerate(
            subnet: &Subnet,
            current: Ipv4Addr,
            to: Ipv4Addr,
            seen: &mut Vec<Ipv4Addr>,
            cost: u32,
            best: &mut Option<u32>,
        ) {
            if current == to {
                *best = Some(best.map_or(cost, |b: u32| b.min(cost)));
                return;
            }
            for other in subnet.systems().iter().map(|s| s.address) {
                if !seen.contains(&other) {
                    if let Some(w) = subnet.edge_weight(current, other) {
                        seen.push(other);
                        enumerate(subnet, other, to, seen, cost + w, best);
                        seen.pop();
                    }
                }
            }
        }

        for &from in &members {
            for &to in &members {
                let mut best = None;
                enumerate(&subnet, from, to, &mut vec![from], 0, &mut best);
                let dijkstra_cost = subnet.shortest_path(from, to).map(|path| {
                    path.windows(2)
                        .map(|pair| subnet.edge_weight(pair[0], pair[1]).unwrap())
                        .sum::<u32>()
                });
                assert_eq!(dijkstra_cost, best, "cost mismatch {} -> {}", from, to);
            }
        }
    }
}
