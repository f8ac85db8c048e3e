//! Inter-subnet search and cross-subnet path composition.

use std::collections::{BinaryHeap, HashSet};
use std::net::Ipv4Addr;

use log::debug;

use crate::error::NetworkError;
use crate::registry::NetworkRegistry;

use super::state::{Candidate, TieBreakState};

/// Ordered hop sequence; no two consecutive entries are equal
pub type Path = Vec<Ipv4Addr>;

/// Full source route between two addresses.
///
/// Same-subnet queries delegate to the owning subnet's weighted search.
/// Cross-subnet queries compose three segments: source to its router,
/// router to router across the mesh, router to destination. Any segment
/// failing aborts the whole query; no partial path is ever produced.
pub fn route(registry: &NetworkRegistry, from: Ipv4Addr, to: Ipv4Addr) -> Result<Path, NetworkError> {
    let subnet_from = registry
        .find_subnet_for(from)
        .ok_or(NetworkError::SubnetNotFound(from))?;
    let subnet_to = registry
        .find_subnet_for(to)
        .ok_or(NetworkError::SubnetNotFound(to))?;

    if subnet_from.base() == subnet_to.base() {
        debug!("intra-subnet delivery {} -> {}", from, to);
        let path = subnet_from
            .shortest_path(from, to)
            .ok_or(NetworkError::NoPathFound { from, to })?;
        return Ok(collapse(path));
    }

    debug!("inter-subnet delivery {} -> {}", from, to);
    let source_router = subnet_from
        .router_address()
        .ok_or(NetworkError::MissingRouter(subnet_from.base()))?;
    let target_router = subnet_to
        .router_address()
        .ok_or(NetworkError::MissingRouter(subnet_to.base()))?;

    let mut path = if from == source_router {
        vec![from]
    } else {
        subnet_from
            .shortest_path(from, source_router)
            .ok_or(NetworkError::NoPathFound { from, to })?
    };

    let across = router_path(registry, source_router, target_router)
        .ok_or(NetworkError::NoPathFound { from, to })?;
    path.extend(across);

    if target_router != to {
        let delivery = subnet_to
            .shortest_path(target_router, to)
            .ok_or(NetworkError::NoPathFound { from, to })?;
        path.extend(delivery);
    }

    Ok(collapse(path))
}

/// Shortest path between two routers across the router mesh.
///
/// The metric is hop count; recorded link weights play no part. Ties are
/// broken by the cascade in `TieBreakState`, so repeated searches over an
/// unchanged mesh always return the identical path. Returns `None` when
/// the destination router is unreachable.
pub fn router_path(registry: &NetworkRegistry, from: Ipv4Addr, to: Ipv4Addr) -> Option<Path> {
    if from == to {
        return Some(vec![from]);
    }

    let links = registry.router_links();
    let mut state = TieBreakState::start(from);
    let mut visited: HashSet<Ipv4Addr> = HashSet::new();
    let mut heap = BinaryHeap::new();
    heap.push(Candidate {
        hops: 0,
        first_hop: None,
        second_hop: None,
        node: from,
    });

    while let Some(candidate) = heap.pop() {
        let node = candidate.node;
        if visited.contains(&node) || !state.is_current(&candidate) {
            continue;
        }
        visited.insert(node);
        if node == to {
            break;
        }

        let Some(neighbors) = links.get(&node) else {
            continue;
        };
        let Some(record) = state.record_for(node).cloned() else {
            continue;
        };
        for &next in neighbors {
            if visited.contains(&next) {
                continue;
            }
            // First and second steps are inherited from the predecessor
            // once fixed; a neighbor of the source starts its own lineage.
            let (first_hop, second_hop) = if node == from {
                (Some(next), None)
            } else if record.first_hop == Some(node) {
                (record.first_hop, Some(next))
            } else {
                (record.first_hop, record.second_hop)
            };
            let next_candidate = Candidate {
                hops: record.hops + 1,
                first_hop,
                second_hop,
                node: next,
            };
            if state.improves(&next_candidate) {
                state.accept(&next_candidate, node);
                heap.push(next_candidate);
            }
        }
    }

    let mut path = vec![to];
    let mut current = to;
    while let Some(prev) = state.previous(current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();

    if path.len() == 1 {
        return None;
    }
    debug!("router path {} -> {}: {} hops", from, to, path.len() - 1);
    Some(path)
}

/// Drop consecutive duplicates left at segment boundaries, where the
/// router address ends one segment and starts the next
fn collapse(mut path: Path) -> Path {
    path.dedup();
    path
}
