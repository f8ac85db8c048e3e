use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;

use routesim::commands::{self, Command};
use routesim::parser;
use routesim::registry::NetworkRegistry;

/// Deterministic source-routing simulator for small IP internetworks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topology description file to load before the session starts
    #[arg(short, long)]
    network: Option<PathBuf>,

    /// Write the loaded topology as JSON to this path and exit
    #[arg(long, requires = "network")]
    dump: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "warn" so session
    // output stays readable
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let mut registry = match &args.network {
        Some(path) => {
            let registry = parser::load_network_file(path)
                .wrap_err_with(|| format!("failed to load network from '{}'", path.display()))?;
            info!("loaded network from {:?}", path);
            registry
        }
        None => NetworkRegistry::new(),
    };

    if let Some(dump_path) = &args.dump {
        let json = serde_json::to_string_pretty(&registry)
            .wrap_err("failed to serialize topology")?;
        fs::write(dump_path, json)
            .wrap_err_with(|| format!("failed to write '{}'", dump_path.display()))?;
        println!("topology written to {}", dump_path.display());
        return Ok(());
    }

    run_session(&mut registry)
}

/// Read commands from stdin until `quit` or end of input
fn run_session(registry: &mut NetworkRegistry) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Welcome to the Routing Network System. Type 'quit' to exit.");
    print!("> ");
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line.wrap_err("failed to read command")?;
        match commands::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => {
                println!("Exiting...");
                return Ok(());
            }
            Ok(Some(command)) => match commands::execute(registry, command) {
                Ok(output) => println!("{}", output),
                Err(err) => println!("Error, {}", err),
            },
            Err(err) => println!("Error, {}", err),
        }
        print!("> ");
        stdout.flush()?;
    }

    Ok(())
}
