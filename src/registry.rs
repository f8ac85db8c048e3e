//! Central topology registry.
//!
//! Owns every subnet keyed by base address plus the router-adjacency graph
//! that links subnets together. All mutation flows through here: an
//! intra-subnet request is delegated to the owning subnet, an inter-subnet
//! request touches the router graph, and a failed operation never leaves
//! partial state behind. The router graph is hop-count based; recorded
//! link weights are kept in a parallel map for reporting only.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use log::{debug, info};
use serde::Serialize;

use crate::error::NetworkError;
use crate::subnet::Subnet;
use crate::system::NetworkSystem;

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct NetworkRegistry {
    subnets: HashMap<Ipv4Addr, Subnet>,
    router_links: HashMap<Ipv4Addr, HashSet<Ipv4Addr>>,
    /// Advisory weights for router links; the inter-subnet search costs
    /// every link one hop regardless
    link_weights: HashMap<Ipv4Addr, HashMap<Ipv4Addr, u32>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    /// Register a new subnet under its base address
    pub fn create_subnet(&mut self, base: Ipv4Addr, prefix_len: u8) -> Result<(), NetworkError> {
        if prefix_len > 32 {
            return Err(NetworkError::PrefixLength(prefix_len));
        }
        if self.subnets.contains_key(&base) {
            return Err(NetworkError::DuplicateSubnet(base));
        }
        info!("created subnet {}/{}", base, prefix_len);
        self.subnets.insert(base, Subnet::new(base, prefix_len));
        Ok(())
    }

    /// Look up a subnet by its base address
    pub fn subnet(&self, base: Ipv4Addr) -> Option<&Subnet> {
        self.subnets.get(&base)
    }

    /// Resolve the subnet whose range contains `address`
    pub fn find_subnet_for(&self, address: Ipv4Addr) -> Option<&Subnet> {
        self.subnets.values().find(|s| s.contains_address(address))
    }

    fn base_for(&self, address: Ipv4Addr) -> Option<Ipv4Addr> {
        self.find_subnet_for(address).map(|s| s.base())
    }

    /// Find a system anywhere in the topology
    pub fn find_system(&self, address: Ipv4Addr) -> Option<&NetworkSystem> {
        self.subnets.values().find_map(|s| s.system(address))
    }

    /// Add a system to the subnet registered under `base`.
    ///
    /// The address must be unique across the entire topology, not just
    /// within the target subnet.
    pub fn add_system(&mut self, base: Ipv4Addr, system: NetworkSystem) -> Result<(), NetworkError> {
        if !self.subnets.contains_key(&base) {
            return Err(NetworkError::SubnetNotFound(base));
        }
        if self.find_system(system.address).is_some() {
            return Err(NetworkError::DuplicateAddress(system.address));
        }
        match self.subnets.get_mut(&base) {
            Some(subnet) => subnet.add_system(system),
            None => Err(NetworkError::SubnetNotFound(base)),
        }
    }

    /// Remove a host from the subnet registered under `base`
    pub fn remove_system(&mut self, base: Ipv4Addr, address: Ipv4Addr) -> Result<(), NetworkError> {
        match self.subnets.get_mut(&base) {
            Some(subnet) => subnet.remove_system(address),
            None => Err(NetworkError::SubnetNotFound(base)),
        }
    }

    /// Connect two addresses.
    ///
    /// Endpoints in the same subnet get a weighted intra-subnet edge;
    /// endpoints in different subnets must both be routers and get a
    /// hop-count link in the router graph, with `weight` recorded for
    /// reporting only.
    pub fn add_connection(&mut self, ip1: Ipv4Addr, ip2: Ipv4Addr, weight: u32) -> Result<(), NetworkError> {
        let base1 = self.base_for(ip1).ok_or(NetworkError::SubnetNotFound(ip1))?;
        let base2 = self.base_for(ip2).ok_or(NetworkError::SubnetNotFound(ip2))?;

        if base1 == base2 {
            return match self.subnets.get_mut(&base1) {
                Some(subnet) => subnet.add_connection(ip1, ip2, weight),
                None => Err(NetworkError::SubnetNotFound(ip1)),
            };
        }

        let router1 = self.subnets.get(&base1).and_then(|s| s.system(ip1));
        let router2 = self.subnets.get(&base2).and_then(|s| s.system(ip2));
        match (router1, router2) {
            (Some(r1), Some(r2)) if r1.is_router() && r2.is_router() => {}
            _ => return Err(NetworkError::ConnectionTypeMismatch),
        }
        if self.router_links.get(&ip1).is_some_and(|n| n.contains(&ip2)) {
            return Err(NetworkError::DuplicateConnection { a: ip1, b: ip2 });
        }

        self.router_links.entry(ip1).or_default().insert(ip2);
        self.router_links.entry(ip2).or_default().insert(ip1);
        self.link_weights.entry(ip1).or_default().insert(ip2, weight);
        self.link_weights.entry(ip2).or_default().insert(ip1, weight);
        info!("added inter-subnet link {} <--> {}", ip1, ip2);
        Ok(())
    }

    /// Remove a connection, intra- or inter-subnet
    pub fn remove_connection(&mut self, ip1: Ipv4Addr, ip2: Ipv4Addr) -> Result<(), NetworkError> {
        let base1 = self.base_for(ip1).ok_or(NetworkError::SubnetNotFound(ip1))?;
        let base2 = self.base_for(ip2).ok_or(NetworkError::SubnetNotFound(ip2))?;

        if base1 == base2 {
            return match self.subnets.get_mut(&base1) {
                Some(subnet) => subnet.remove_connection(ip1, ip2),
                None => Err(NetworkError::SubnetNotFound(ip1)),
            };
        }

        if !self.router_links.get(&ip1).is_some_and(|n| n.contains(&ip2)) {
            return Err(NetworkError::ConnectionNotFound { a: ip1, b: ip2 });
        }
        for (from, to) in [(ip1, ip2), (ip2, ip1)] {
            if let Some(neighbors) = self.router_links.get_mut(&from) {
                neighbors.remove(&to);
                if neighbors.is_empty() {
                    self.router_links.remove(&from);
                }
            }
            if let Some(weights) = self.link_weights.get_mut(&from) {
                weights.remove(&to);
                if weights.is_empty() {
                    self.link_weights.remove(&from);
                }
            }
        }
        info!("removed inter-subnet link {} <--> {}", ip1, ip2);
        Ok(())
    }

    /// The router-adjacency graph, for the inter-subnet search
    pub fn router_links(&self) -> &HashMap<Ipv4Addr, HashSet<Ipv4Addr>> {
        &self.router_links
    }

    /// Recorded weight of a router link, if any
    pub fn link_weight(&self, a: Ipv4Addr, b: Ipv4Addr) -> Option<u32> {
        self.link_weights.get(&a).and_then(|weights| weights.get(&b)).copied()
    }

    /// All subnets ordered by numeric base address
    pub fn list_subnets(&self) -> Vec<&Subnet> {
        let mut subnets: Vec<&Subnet> = self.subnets.values().collect();
        subnets.sort_by_key(|s| u32::from(s.base()));
        subnets
    }

    /// First and last address of the subnet registered under `base`
    pub fn subnet_range(&self, base: Ipv4Addr) -> Result<(Ipv4Addr, Ipv4Addr), NetworkError> {
        let subnet = self.subnet(base).ok_or(NetworkError::SubnetNotFound(base))?;
        Ok((subnet.base(), subnet.last_address()))
    }

    /// Member addresses of the subnet registered under `base`, in
    /// insertion order
    pub fn list_systems(&self, base: Ipv4Addr) -> Result<Vec<Ipv4Addr>, NetworkError> {
        let subnet = self.subnet(base).ok_or(NetworkError::SubnetNotFound(base))?;
        Ok(subnet.systems().iter().map(|s| s.address).collect())
    }

    /// Verify the one-router-per-subnet invariant across the topology.
    ///
    /// The loader runs this after building a registry so a description
    /// with a router-less subnet fails fast instead of failing later
    /// inside a routing query.
    pub fn validate(&self) -> Result<(), NetworkError> {
        for subnet in self.subnets.values() {
            let routers = subnet.systems().iter().filter(|s| s.is_router()).count();
            match routers {
                0 => return Err(NetworkError::MissingRouter(subnet.base())),
                1 => {}
                _ => return Err(NetworkError::DuplicateRouter(subnet.base())),
            }
        }
        debug!("topology validated: {} subnets", self.subnets.len());
        Ok(())
    }
}
