//! Per-search bookkeeping for the inter-subnet search.
//!
//! A router mesh can hold many equal-hop paths, so the frontier is kept in
//! a strict total order: fewer hops first, then the smaller first-hop
//! address, then the smaller second-hop address, then the smaller node
//! address. Hop addresses compare as dotted-quad strings, not numerically.
//! An unset hop compares as the empty string and therefore sorts first.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// Best state recorded for a router during one search
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HopRecord {
    pub hops: u32,
    /// Neighbor of the source chosen as the first step toward this node
    pub first_hop: Option<Ipv4Addr>,
    /// Second step, fixed once the first hop is
    pub second_hop: Option<Ipv4Addr>,
}

/// Frontier entry: a snapshot of a router's ranking keys at push time
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub hops: u32,
    pub first_hop: Option<Ipv4Addr>,
    pub second_hop: Option<Ipv4Addr>,
    pub node: Ipv4Addr,
}

fn hop_string(hop: Option<Ipv4Addr>) -> String {
    hop.map(|addr| addr.to_string()).unwrap_or_default()
}

impl Candidate {
    fn rank(&self) -> (u32, String, String, String) {
        (
            self.hops,
            hop_string(self.first_hop),
            hop_string(self.second_hop),
            self.node.to_string(),
        )
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other.rank().cmp(&self.rank())
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Hop counts, hop lineage, and predecessors for one search
#[derive(Debug, Default)]
pub(crate) struct TieBreakState {
    records: HashMap<Ipv4Addr, HopRecord>,
    previous: HashMap<Ipv4Addr, Ipv4Addr>,
}

impl TieBreakState {
    pub fn start(source: Ipv4Addr) -> Self {
        let mut state = Self::default();
        state.records.insert(
            source,
            HopRecord {
                hops: 0,
                first_hop: None,
                second_hop: None,
            },
        );
        state
    }

    pub fn record_for(&self, node: Ipv4Addr) -> Option<&HopRecord> {
        self.records.get(&node)
    }

    pub fn previous(&self, node: Ipv4Addr) -> Option<Ipv4Addr> {
        self.previous.get(&node).copied()
    }

    /// True when `candidate` strictly improves on the recorded state of
    /// its node under the cascade ordering. The node address itself is
    /// identical on both sides, so only the first three keys decide.
    pub fn improves(&self, candidate: &Candidate) -> bool {
        match self.records.get(&candidate.node) {
            None => true,
            Some(current) => {
                let candidate_key = (
                    candidate.hops,
                    hop_string(candidate.first_hop),
                    hop_string(candidate.second_hop),
                );
                let current_key = (
                    current.hops,
                    hop_string(current.first_hop),
                    hop_string(current.second_hop),
                );
                candidate_key < current_key
            }
        }
    }

    /// True when a popped frontier entry still matches the recorded state
    /// of its node; stale snapshots are discarded by the search loop.
    pub fn is_current(&self, candidate: &Candidate) -> bool {
        self.records.get(&candidate.node).is_some_and(|current| {
            current.hops == candidate.hops
                && current.first_hop == candidate.first_hop
                && current.second_hop == candidate.second_hop
        })
    }

    pub fn accept(&mut self, candidate: &Candidate, previous: Ipv4Addr) {
        self.records.insert(
            candidate.node,
            HopRecord {
                hops: candidate.hops,
                first_hop: candidate.first_hop,
                second_hop: candidate.second_hop,
            },
        );
        self.previous.insert(candidate.node, previous);
    }
}
