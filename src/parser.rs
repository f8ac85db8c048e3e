//! Network description parser.
//!
//! Loads the flowchart-style topology files consumed by the `load network`
//! command:
//!
//! ```text
//! graph
//!     subgraph 192.168.1.0/24
//!         Router1[192.168.1.1]
//!         PC1[192.168.1.2]
//!         PC1 <-->|5| Router1
//!     end
//!     Router1 <--> Router2
//! ```
//!
//! `subgraph <base>/<prefix>` blocks declare subnets, `Name[ip]` lines
//! declare systems (the role is Router when the name contains "router",
//! case-insensitively), `A <-->|w| B` declares a weighted edge inside a
//! block and `A <--> B` outside of one declares a router link. The parser
//! resolves device names to addresses itself; the registry only ever sees
//! addresses. Inter-subnet lines are applied after the whole file has been
//! read, so router links may reference devices declared further down.

use std::collections::HashMap;
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::addr;
use crate::error::NetworkError;
use crate::registry::NetworkRegistry;
use crate::system::NetworkSystem;

/// Line patterns for the description format
struct LinePatterns {
    subgraph: Regex,
    edge: Regex,
    system: Regex,
}

impl LinePatterns {
    fn new() -> Self {
        Self {
            subgraph: Regex::new(r"^subgraph\s+(\S+)$").expect("Invalid subgraph regex"),
            edge: Regex::new(r"^(\S+)\s*<-->\s*(?:\|\s*(-?\d+)\s*\|\s*)?(\S+)$")
                .expect("Invalid edge regex"),
            system: Regex::new(r"^(\S+?)\s*\[\s*([^\]\s]+)\s*\]$").expect("Invalid system regex"),
        }
    }
}

static PATTERNS: LazyLock<LinePatterns> = LazyLock::new(LinePatterns::new);

/// Load and validate a topology from a description file
pub fn load_network_file(path: &Path) -> Result<NetworkRegistry, NetworkError> {
    let content = fs::read_to_string(path).map_err(|err| NetworkError::Parse {
        line: 0,
        message: format!("cannot read '{}': {}", path.display(), err),
    })?;
    parse_network(&content)
}

/// Parse a topology description and build a validated registry.
///
/// Fails on the first structural or semantic problem; the partially built
/// registry is discarded.
pub fn parse_network(input: &str) -> Result<NetworkRegistry, NetworkError> {
    let mut loader = Loader::default();
    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        loader.consume(line_no, line)?;
    }
    loader.finish()
}

/// Connection line held until its endpoints are known
#[derive(Debug)]
struct EdgeLine {
    from: String,
    weight: i64,
    to: String,
}

#[derive(Debug, Default)]
struct Loader {
    registry: NetworkRegistry,
    /// Device name to address, load scope only
    names: HashMap<String, Ipv4Addr>,
    /// Open subgraph block: (opening line, subnet base)
    current: Option<(usize, Ipv4Addr)>,
    /// Inter-subnet lines, applied once every device is declared
    deferred: Vec<(usize, EdgeLine)>,
}

impl Loader {
    fn consume(&mut self, line_no: usize, line: &str) -> Result<(), NetworkError> {
        if let Some(captures) = PATTERNS.subgraph.captures(line) {
            if self.current.is_some() {
                return Err(parse_error(line_no, "nested 'subgraph' block"));
            }
            let (base, prefix_len) = addr::parse_cidr(&captures[1])?;
            self.registry.create_subnet(base, prefix_len)?;
            self.current = Some((line_no, base));
            return Ok(());
        }

        if line == "end" {
            if self.current.take().is_none() {
                return Err(parse_error(line_no, "'end' outside a subgraph block"));
            }
            return Ok(());
        }

        if line.contains("<-->") {
            let captures = PATTERNS
                .edge
                .captures(line)
                .ok_or_else(|| parse_error(line_no, "malformed connection line"))?;
            let weight = match captures.get(2) {
                Some(weight) => weight
                    .as_str()
                    .parse()
                    .map_err(|_| parse_error(line_no, "invalid connection weight"))?,
                None => 0,
            };
            let edge = EdgeLine {
                from: captures[1].to_string(),
                weight,
                to: captures[3].to_string(),
            };
            if self.current.is_some() {
                self.apply_edge(line_no, &edge)?;
            } else {
                self.deferred.push((line_no, edge));
            }
            return Ok(());
        }

        if let Some(captures) = PATTERNS.system.captures(line) {
            let Some((_, base)) = self.current else {
                debug!("line {}: system declaration outside a subgraph block, skipped", line_no);
                return Ok(());
            };
            let name = captures[1].to_string();
            let address = addr::parse_ipv4(&captures[2])?;
            let system = if name.to_lowercase().contains("router") {
                NetworkSystem::router(address)
            } else {
                NetworkSystem::host(address)
            };
            self.registry.add_system(base, system)?;
            self.names.insert(name, address);
            return Ok(());
        }

        debug!("line {}: unrecognized line '{}', skipped", line_no, line);
        Ok(())
    }

    fn apply_edge(&mut self, line_no: usize, edge: &EdgeLine) -> Result<(), NetworkError> {
        let from = self.resolve(line_no, &edge.from)?;
        let to = self.resolve(line_no, &edge.to)?;
        if edge.weight < 0 {
            return Err(NetworkError::InvalidWeight(edge.weight));
        }
        let weight =
            u32::try_from(edge.weight).map_err(|_| NetworkError::InvalidWeight(edge.weight))?;
        self.registry.add_connection(from, to, weight)
    }

    fn resolve(&self, line_no: usize, name: &str) -> Result<Ipv4Addr, NetworkError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| parse_error(line_no, &format!("device '{}' not declared", name)))
    }

    fn finish(mut self) -> Result<NetworkRegistry, NetworkError> {
        if let Some((line_no, _)) = self.current {
            return Err(parse_error(line_no, "unterminated 'subgraph' block"));
        }
        let deferred = std::mem::take(&mut self.deferred);
        for (line_no, edge) in &deferred {
            self.apply_edge(*line_no, edge)?;
        }
        self.registry.validate()?;
        debug!("loaded {} subnets", self.registry.list_subnets().len());
        Ok(self.registry)
    }
}

fn parse_error(line: usize, message: &str) -> NetworkError {
    NetworkError::Parse {
        line,
        message: message.to_string(),
    }
}
