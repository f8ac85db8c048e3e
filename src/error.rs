//! Error taxonomy for topology mutation and routing queries.
//!
//! Every fallible operation returns `Result<_, NetworkError>`. Errors are
//! plain result values recovered at the command boundary; a failed mutation
//! never leaves partial state behind.

use std::net::Ipv4Addr;

/// Errors produced by topology mutation, routing queries, and loading
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid IPv4 address '{0}'")]
    AddressFormat(String),

    #[error("invalid prefix length /{0}")]
    PrefixLength(u8),

    #[error("address {0} does not belong to any subnet")]
    SubnetNotFound(Ipv4Addr),

    #[error("system {0} not found")]
    SystemNotFound(Ipv4Addr),

    #[error("connection between {a} and {b} already exists")]
    DuplicateConnection { a: Ipv4Addr, b: Ipv4Addr },

    #[error("no connection between {a} and {b}")]
    ConnectionNotFound { a: Ipv4Addr, b: Ipv4Addr },

    #[error("connection weight must be positive, got {0}")]
    InvalidWeight(i64),

    #[error("inter-subnet connections are only allowed between routers")]
    ConnectionTypeMismatch,

    #[error("no path found between {from} and {to}")]
    NoPathFound { from: Ipv4Addr, to: Ipv4Addr },

    #[error("cannot remove router {0} from its subnet")]
    RouterRemovalDenied(Ipv4Addr),

    #[error("subnet {0} already exists")]
    DuplicateSubnet(Ipv4Addr),

    #[error("address {0} is already assigned")]
    DuplicateAddress(Ipv4Addr),

    #[error("address {addr} is outside subnet {base}/{prefix_len}")]
    AddressOutOfRange {
        addr: Ipv4Addr,
        base: Ipv4Addr,
        prefix_len: u8,
    },

    #[error("subnet {0} already has a router")]
    DuplicateRouter(Ipv4Addr),

    #[error("subnet {0} has no router")]
    MissingRouter(Ipv4Addr),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}
