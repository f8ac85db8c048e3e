//! Command parsing and dispatch for the interactive session.
//!
//! Lines are parsed into typed commands and executed against the
//! registry; execution returns the text to display, so rendering stays
//! with the caller. Every failure is a `NetworkError` result value and
//! the session continues after reporting it.

use std::net::Ipv4Addr;
use std::path::Path;

use log::info;

use crate::addr;
use crate::error::NetworkError;
use crate::parser;
use crate::registry::NetworkRegistry;
use crate::routing;
use crate::system::NetworkSystem;

/// A parsed session command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadNetwork(String),
    ListSubnets,
    ListRange(Ipv4Addr),
    ListSystems(Ipv4Addr),
    AddComputer { base: Ipv4Addr, address: Ipv4Addr },
    AddConnection { a: Ipv4Addr, b: Ipv4Addr, weight: i64 },
    RemoveComputer { base: Ipv4Addr, address: Ipv4Addr },
    RemoveConnection { a: Ipv4Addr, b: Ipv4Addr },
    SendPacket { from: Ipv4Addr, to: Ipv4Addr },
    Quit,
}

/// Parse one input line. Returns `None` for blank lines.
pub fn parse(line: &str) -> Result<Option<Command>, NetworkError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&verb) = parts.first() else {
        return Ok(None);
    };

    let command = match (verb, parts.len()) {
        ("quit", 1) => Command::Quit,
        ("load", 3) if parts[1] == "network" => Command::LoadNetwork(parts[2].to_string()),
        ("load", _) => {
            return Err(invalid("expected 'load network <file_path>'"));
        }
        ("list", 2) if parts[1] == "subnets" => Command::ListSubnets,
        ("list", 3) if parts[1] == "range" => Command::ListRange(subnet_base(parts[2])?),
        ("list", 3) if parts[1] == "systems" => Command::ListSystems(subnet_base(parts[2])?),
        ("list", _) => {
            return Err(invalid("expected 'list subnets', 'list range <subnet>', or 'list systems <subnet>'"));
        }
        ("add", 4) if parts[1] == "computer" => Command::AddComputer {
            base: subnet_base(parts[2])?,
            address: addr::parse_ipv4(parts[3])?,
        },
        ("add", 4 | 5) if parts[1] == "connection" => {
            let a = addr::parse_ipv4(parts[2])?;
            let b = addr::parse_ipv4(parts[3])?;
            if a == b {
                return Err(invalid("connection endpoints must differ"));
            }
            let weight = match parts.get(4) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| invalid("expected an integer connection weight"))?,
                None => 0,
            };
            Command::AddConnection { a, b, weight }
        }
        ("add", _) => {
            return Err(invalid("expected 'add computer <subnet> <ip>' or 'add connection <ip1> <ip2> [weight]'"));
        }
        ("remove", 4) if parts[1] == "computer" => Command::RemoveComputer {
            base: subnet_base(parts[2])?,
            address: addr::parse_ipv4(parts[3])?,
        },
        ("remove", 4) if parts[1] == "connection" => Command::RemoveConnection {
            a: addr::parse_ipv4(parts[2])?,
            b: addr::parse_ipv4(parts[3])?,
        },
        ("remove", _) => {
            return Err(invalid("expected 'remove computer <subnet> <ip>' or 'remove connection <ip1> <ip2>'"));
        }
        ("send", 4) if parts[1] == "packet" => Command::SendPacket {
            from: addr::parse_ipv4(parts[2])?,
            to: addr::parse_ipv4(parts[3])?,
        },
        ("send", _) => {
            return Err(invalid("expected 'send packet <from_ip> <to_ip>'"));
        }
        (unknown, _) => {
            return Err(invalid(&format!("unknown command '{}'", unknown)));
        }
    };
    Ok(Some(command))
}

/// Execute a command against the registry and return the output text
pub fn execute(registry: &mut NetworkRegistry, command: Command) -> Result<String, NetworkError> {
    match command {
        Command::Quit => Ok(String::new()),

        Command::LoadNetwork(path) => {
            *registry = parser::load_network_file(Path::new(&path))?;
            info!("loaded network from {}", path);
            Ok(format!("loaded {} subnets from {}", registry.list_subnets().len(), path))
        }

        Command::ListSubnets => {
            let subnets = registry.list_subnets();
            if subnets.is_empty() {
                return Ok("no subnets defined".to_string());
            }
            let listing: Vec<String> = subnets.iter().map(|s| s.cidr()).collect();
            Ok(listing.join(" "))
        }

        Command::ListRange(base) => {
            let (first, last) = registry.subnet_range(base)?;
            Ok(format!("{} {}", first, last))
        }

        Command::ListSystems(base) => {
            let systems = registry.list_systems(base)?;
            let listing: Vec<String> = systems.iter().map(|a| a.to_string()).collect();
            Ok(listing.join(" "))
        }

        Command::AddComputer { base, address } => {
            registry.add_system(base, NetworkSystem::host(address))?;
            Ok(format!("added computer {}", address))
        }

        Command::AddConnection { a, b, weight } => {
            if weight < 0 {
                return Err(NetworkError::InvalidWeight(weight));
            }
            let weight =
                u32::try_from(weight).map_err(|_| NetworkError::InvalidWeight(weight))?;
            registry.add_connection(a, b, weight)?;
            Ok(format!("added connection {} <--> {}", a, b))
        }

        Command::RemoveComputer { base, address } => {
            registry.remove_system(base, address)?;
            Ok(format!("removed computer {}", address))
        }

        Command::RemoveConnection { a, b } => {
            registry.remove_connection(a, b)?;
            Ok(format!("removed connection {} <--> {}", a, b))
        }

        Command::SendPacket { from, to } => {
            let path = routing::route(registry, from, to)?;
            let hops: Vec<String> = path.iter().map(|a| a.to_string()).collect();
            Ok(format!("packet path: {}", hops.join(" ")))
        }
    }
}

/// Accept a subnet argument as `base` or `base/prefix`
fn subnet_base(input: &str) -> Result<Ipv4Addr, NetworkError> {
    let base_part = input.split('/').next().unwrap_or(input);
    addr::parse_ipv4(base_part)
}

fn invalid(message: &str) -> NetworkError {
    NetworkError::InvalidCommand(message.to_string())
}
