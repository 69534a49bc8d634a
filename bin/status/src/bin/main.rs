use alloy_primitives::{Address, B256};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use withdrawal_status::{
    build_engine, config::Config, describe, metrics, resolve_all, watch,
};

#[derive(Parser)]
#[command(name = "withdrawal-status")]
#[command(about = "Resolve the L1 status of L2→L1 withdrawals")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a JSON status report for each transaction
    Status {
        /// L2 transaction hashes
        #[arg(required = true)]
        tx_hashes: Vec<B256>,

        /// Sender used to dry-run the finalization call
        #[arg(long)]
        caller: Option<Address>,
    },
    /// Re-resolve a transaction periodically until it is executed
    Watch {
        /// L2 transaction hash
        tx_hash: B256,

        /// Seconds between resolutions
        #[arg(short, long, default_value_t = 60)]
        interval: u64,

        /// Sender used to dry-run the finalization call
        #[arg(long)]
        caller: Option<Address>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    info!("Loading config: {:?}", cli.config);
    let config = Config::from_file(&cli.config)?;
    let engine = build_engine(&config)?;

    match cli.command {
        Commands::Status { tx_hashes, caller } => {
            let engine = match caller {
                Some(caller) => engine.with_caller(caller),
                None => engine,
            };

            let mut failed = 0usize;
            for (tx_hash, result) in resolve_all(Arc::new(engine), &tx_hashes).await {
                match result {
                    Ok(report) => {
                        info!(tx = %tx_hash, "{}", describe(&report.status));
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    }
                    Err(e) => {
                        failed += 1;
                        error!(tx = %tx_hash, "Failed to resolve: {}", e);
                        let output = serde_json::json!({
                            "tx_hash": tx_hash,
                            "error": e.to_string(),
                        });
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                }
            }

            if failed > 0 {
                eyre::bail!("{failed} of {} transactions failed to resolve", tx_hashes.len());
            }
        }
        Commands::Watch {
            tx_hash,
            interval,
            caller,
        } => {
            let engine = match caller {
                Some(caller) => engine.with_caller(caller),
                None => engine,
            };

            if let Some(port) = config.metrics_port {
                metrics::install_prometheus_exporter(port)?;
                info!("Prometheus metrics on port {}", port);
            }
            let metrics = metrics::Metrics::new();

            info!(tx = %tx_hash, interval, "Watching withdrawal");
            watch(&engine, tx_hash, Duration::from_secs(interval), &metrics).await?;
        }
    }

    Ok(())
}
