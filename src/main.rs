//! SDN load-balancer controller daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                DECISION CORE                     │
//!   ConnectionUp  │  ┌─────────┐   ┌──────────┐   ┌──────────────┐  │
//!   PacketIn ─────┼─▶│ channel │──▶│  engine  │──▶│   balancer   │  │
//!   (from the     │  │  seam   │   │ dispatch │   │ (hash → idx) │  │
//!   control-      │  └─────────┘   └────┬─────┘   └──────┬───────┘  │
//!   channel       │                     │                │          │
//!   runtime)      │               ┌─────▼─────┐   ┌──────▼───────┐  │
//!                 │               │ responder │   │   topology   │  │
//!                 │               │ (VIP ARP) │   │ (path table) │  │
//!                 │               └─────┬─────┘   └──────┬───────┘  │
//!                 │                     │                │          │
//!   InstallRule   │               ┌─────▼────────────────▼───────┐  │
//!   PacketOut ◀───┼───────────────│  rules builder + installer   │  │
//!                 │               └──────────────────────────────┘  │
//!                 │   config / observability / lifecycle around it  │
//!                 └──────────────────────────────────────────────────┘
//! ```
//!
//! The daemon loads and validates configuration, starts the engine's
//! single-consumer event loop, and hands a [`ControllerHandle`] to whatever
//! control-channel runtime embeds it. Session bring-up and OpenFlow message
//! codecs live in that runtime, not here.

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;

use vip_balancer::channel::ControllerHandle;
use vip_balancer::config::load_config;
use vip_balancer::engine::FlowDecisionEngine;
use vip_balancer::lifecycle::{shutdown_signal, Shutdown};
use vip_balancer::observability::init_logging;

/// Queue depth between the control-channel runtime and the engine loop.
const EVENT_QUEUE_DEPTH: usize = 1024;

#[derive(Parser)]
#[command(name = "vip-balancer")]
#[command(about = "Decision core for a VIP load-balancing SDN controller", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config/vip-balancer.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Fail fast: an invalid table or an empty backend set never reaches a
    // running engine.
    let config = load_config(&args.config)?;
    init_logging(&config.observability);

    tracing::info!(
        config = %args.config.display(),
        vip = %config.virtual_service.ip,
        backends = config.backends.len(),
        endpoints = config.endpoints.len(),
        paths = config.paths.len(),
        "configuration loaded"
    );

    let engine = FlowDecisionEngine::new(&config);
    let shutdown = Shutdown::new();
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let handle = ControllerHandle::new(tx);

    let engine_task = tokio::spawn(engine.run(rx, shutdown.subscribe()));

    // The embedding control-channel runtime delivers events through this
    // handle; keeping it alive keeps the loop running until a signal.
    let _runtime_seam = handle;
    tracing::info!("waiting for control-channel events (SIGINT/SIGTERM to stop)");

    shutdown_signal().await;
    tracing::info!("shutdown signal received");
    shutdown.trigger();
    engine_task.await?;

    tracing::info!("shutdown complete");
    Ok(())
}
