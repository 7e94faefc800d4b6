//! `store-balancer`: start a backend pool, report its state, pick on an interval.
//!
//! ```text
//! config (TOML, optional)
//!     → Pool::new (probe every backend once, start monitors)
//!     → every report interval: log status, log one Pool::next pick
//!     → SIGINT/SIGTERM: Pool::close
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use store_balancer::config::{load_config, BalancerConfig};
use store_balancer::lifecycle::signals;
use store_balancer::observability::{logging, metrics};
use store_balancer::{BalanceMode, Pool, RespConnector};

#[derive(Parser)]
#[command(name = "store-balancer")]
#[command(about = "Health-checked client-side balancing over store replicas", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured balance mode
    #[arg(short, long)]
    mode: Option<BalanceMode>,

    /// Interval between status reports, in milliseconds
    #[arg(long, default_value_t = 5_000)]
    report_interval_ms: u64,

    /// Print one JSON status snapshot and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BalancerConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    logging::init(&config.logging);
    tracing::info!("store-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    if config.metrics.enabled {
        match config.metrics.address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.metrics.address,
                "failed to parse metrics address"
            ),
        }
    }

    let connector = RespConnector::new(config.dial_timeout());
    let pool = Pool::new(&config, &connector).await;

    if cli.once {
        println!("{}", serde_json::to_string_pretty(&pool.status())?);
        pool.close().await?;
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(cli.report_interval_ms.max(1)));
    let signal = signals::wait_for_signal();
    tokio::pin!(signal);

    loop {
        tokio::select! {
            _ = &mut signal => break,
            _ = ticker.tick() => report(&pool),
        }
    }

    pool.close().await?;
    tracing::info!("shutdown complete");
    Ok(())
}

fn report(pool: &Pool) {
    for status in pool.status() {
        tracing::info!(
            backend = %status.address,
            network = %status.network,
            up = status.up,
            connections = status.connections,
            latency_ms = status.latency_ms,
            "backend status"
        );
    }
    let endpoint = pool.next();
    tracing::info!(mode = %pool.mode(), picked = %endpoint, "next backend");
}
