use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use socium_core::{Simulation, SimulationConfig};
use socium_server::{AppState, build_router, catalog};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "socium-server", about = "HTTP boundary for the Socium simulation")]
struct Args {
    /// Address to bind the HTTP listener on.
    #[arg(long, default_value = "0.0.0.0:8021")]
    listen: SocketAddr,

    /// Path to the personality catalog file.
    #[arg(long, default_value = "personalities.json")]
    catalog: PathBuf,

    /// Initial world width in world units.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Initial world height in world units.
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// RNG seed for reproducible runs.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let catalog = catalog::load_catalog(&args.catalog)?;
    info!(entries = catalog.len(), path = %args.catalog.display(), "loaded personality catalog");

    let config = SimulationConfig {
        width: args.width,
        height: args.height,
        rng_seed: args.seed,
        ..SimulationConfig::default()
    };
    let simulation = Simulation::new(config, catalog.clone())?;
    info!(
        agents = simulation.agent_count(),
        width = args.width,
        height = args.height,
        "simulation ready"
    );

    let state = Arc::new(AppState::new(simulation, catalog));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!(addr = %args.listen, "socium server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
