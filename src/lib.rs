//! # RouteSim - Deterministic source routing over modeled IP internetworks
//!
//! This library models a small internetwork of disjoint IPv4 subnets, each
//! holding exactly one router, connected through router-to-router links.
//! It answers topology introspection queries (which subnets and systems
//! exist, subnet address ranges) and computes the full hop sequence a
//! packet would traverse between two addresses.
//!
//! ## Routing model
//!
//! Routing is two-tier. Inside a subnet, paths minimize summed edge
//! weight over the subnet's own connection graph. Between subnets, paths
//! are found on the router mesh by hop count, with a strict tie-break
//! cascade (hop count, then first-hop, second-hop, and node address in
//! dotted-quad string order) so equal-hop meshes always yield the same
//! path. A cross-subnet route is stitched from three segments: source to
//! its router, router to router, router to destination.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `addr`: dotted-quad parsing and prefix-mask arithmetic
//! - `system`: endpoint records with Host/Router roles
//! - `subnet`: per-subnet membership, weighted edges, intra-subnet search
//! - `registry`: subnets keyed by base address plus the router mesh
//! - `routing`: inter-subnet search and cross-subnet path composition
//! - `parser`: the flowchart-style network description loader
//! - `commands`: typed session commands and their execution
//! - `error`: the error taxonomy shared by all of the above
//!
//! ## Example Usage
//!
//! ```rust
//! use routesim::{registry::NetworkRegistry, routing, NetworkSystem};
//!
//! let mut registry = NetworkRegistry::new();
//! registry.create_subnet("192.168.1.0".parse()?, 24)?;
//! registry.add_system(
//!     "192.168.1.0".parse()?,
//!     NetworkSystem::router("192.168.1.1".parse()?),
//! )?;
//! registry.add_system(
//!     "192.168.1.0".parse()?,
//!     NetworkSystem::host("192.168.1.2".parse()?),
//! )?;
//! registry.add_connection("192.168.1.1".parse()?, "192.168.1.2".parse()?, 2)?;
//!
//! let path = routing::route(&registry, "192.168.1.2".parse()?, "192.168.1.1".parse()?)?;
//! assert_eq!(path.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns `Result<_, NetworkError>`. Failed
//! mutations never leave partial state behind, and the interactive session
//! reports the error and continues.

pub mod addr;
pub mod commands;
pub mod error;
pub mod parser;
pub mod registry;
pub mod routing;
pub mod subnet;
pub mod system;

pub use error::NetworkError;
pub use registry::NetworkRegistry;
pub use routing::{route, Path};
pub use subnet::Subnet;
pub use system::{NetworkSystem, Role};
