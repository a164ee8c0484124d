use clap::Parser;
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cold_chain_agent::{
    probe::{wait_until_reachable, HttpProbe, SystemClock, RETRY_INTERVAL},
    Agent, Config,
};

/// Simulates the truck's zone sensors and uploads the average temperature.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Run a single tick after the probe and exit
    #[arg(long)]
    once: bool,

    /// Start sending without waiting for the store to answer
    #[arg(long)]
    skip_probe: bool,

    /// Accept invalid TLS certificates (closed test networks only)
    #[arg(long)]
    insecure: bool,

    /// Override SENSOR_COUNT
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    sensor_count: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = Config::from_env();
    if args.insecure {
        config.insecure_skip_verify = true;
    }
    if let Some(count) = args.sensor_count {
        config.sensor_count = count as usize;
    }

    info!("Edge processor started for truck {}", config.truck_vin);
    info!("  Data store: {}", config.base_url);
    info!("  Sensors: {}", config.sensor_count);

    if args.skip_probe {
        warn!("Skipping startup probe");
    } else {
        info!("Testing PostgREST connectivity...");
        let probe = HttpProbe::new(&config)?;
        let attempts =
            wait_until_reachable(&probe, &SystemClock, config.startup_budget(), RETRY_INTERVAL)
                .await?;
        info!("PostgREST connected after {} attempt(s), starting upload", attempts);
    }

    let agent = Agent::new(config)?;
    if args.once {
        agent.tick().await;
        return Ok(());
    }

    agent.run().await;
    Ok(())
}
