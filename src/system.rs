//! Network endpoint records.
//!
//! A system is an immutable (address, role) pair. Identity is the address;
//! addresses are unique across the whole topology and uniqueness is
//! enforced by the registry at insertion time.

use std::net::Ipv4Addr;

use serde::Serialize;

/// Role of a system inside its subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Host,
    Router,
}

/// Immutable endpoint record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetworkSystem {
    pub address: Ipv4Addr,
    pub role: Role,
}

impl NetworkSystem {
    pub fn new(address: Ipv4Addr, role: Role) -> Self {
        Self { address, role }
    }

    pub fn host(address: Ipv4Addr) -> Self {
        Self::new(address, Role::Host)
    }

    pub fn router(address: Ipv4Addr) -> Self {
        Self::new(address, Role::Router)
    }

    pub fn is_router(&self) -> bool {
        self.role == Role::Router
    }
}
