//! Inter-subnet routing.
//!
//! The router mesh is searched by hop count with a deterministic
//! tie-break cascade, and cross-subnet routes are stitched together from
//! three segments: source to its router, router to router through the
//! mesh, router to destination.

mod state;

pub mod engine;

pub use engine::{route, router_path, Path};
