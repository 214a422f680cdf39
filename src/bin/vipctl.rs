//! Offline inspection CLI for the decision core.
//!
//! Answers the two questions operators keep asking a hash-based balancer
//! without touching a live controller: which backend does a flow land on,
//! and which hops will its rules be installed at.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use vip_balancer::balancer::{AddressHasher, BackendSet, FlowKey};
use vip_balancer::config::load_config;
use vip_balancer::topology::PathTable;

#[derive(Parser)]
#[command(name = "vipctl")]
#[command(about = "Inspect a vip-balancer configuration offline", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config/vip-balancer.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the configuration
    Validate,
    /// Show which backend the hash selects for a flow
    Select {
        /// Client (source) address
        #[arg(long)]
        src: Ipv4Addr,
        /// Destination address (normally the VIP)
        #[arg(long)]
        dst: Ipv4Addr,
        /// Source transport port, honored only with per-connection hashing
        #[arg(long)]
        sport: Option<u16>,
    },
    /// Print the hop sequence from an endpoint to a backend
    Path {
        #[arg(long)]
        endpoint: String,
        #[arg(long)]
        backend: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Validate => {
            println!(
                "ok: vip {}, {} backends, {} endpoints, {} paths",
                config.virtual_service.ip,
                config.backends.len(),
                config.endpoints.len(),
                config.paths.len()
            );
        }
        Commands::Select { src, dst, sport } => {
            let hasher = AddressHasher::new(config.hashing.include_source_port);
            let backends = BackendSet::from_config(&config.backends);
            let key = FlowKey {
                src,
                dst,
                src_port: if config.hashing.include_source_port {
                    sport
                } else {
                    None
                },
            };
            let index = hasher.select(&key, backends.len());
            match backends.get(index) {
                Some(backend) => println!(
                    "{} -> backend {} ({} at {}:{})",
                    String::from_utf8_lossy(&key.canonical_bytes()),
                    backend.name,
                    backend.ip,
                    backend.switch,
                    backend.port
                ),
                None => eprintln!("selected index {} out of range", index),
            }
        }
        Commands::Path { endpoint, backend } => {
            let table = PathTable::from_config(&config);
            let entry = table.resolve(&endpoint, &backend)?;
            for (i, hop) in entry.hops.iter().enumerate() {
                println!("{:>2}. {} out_port {}", i + 1, hop.switch, hop.out_port);
            }
            println!("return_port {}", entry.return_port);
        }
    }

    Ok(())
}
