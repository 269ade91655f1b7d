mod audit_builder;
mod conf;
mod driver;
mod error;
mod es_client;
mod indexer;
mod models;
mod pool;
mod stats;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use human_bytes::human_bytes;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use crate::conf::Config;
use crate::driver::{BenchmarkDriver, RunPlan, RunSummary};
use crate::error::Result;
use crate::es_client::EsClient;
use crate::indexer::BulkIndexer;
use crate::pool::StringPool;

/// Bulk-index synthetic documents and print throughput per flush.
#[derive(Parser, Debug)]
#[command(name = "es-bulk-bench", version, about)]
struct Args {
    /// First document id (defaults to 1)
    start: Option<String>,
    /// TOML or JSON config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);
    info!("Application started!");

    match run(args).await {
        Ok(summary) => {
            let memory = memory_stats::memory_stats()
                .map(|stats| human_bytes(stats.physical_mem as f64))
                .unwrap_or_else(|| "n/a".to_string());
            info!(
                "Finished: documents={}, flushes={}, succeeded={}, failed={}, counter={}, elapsed={:?}, memory={}",
                summary.documents,
                summary.flushes,
                summary.succeeded,
                summary.failed,
                summary.total_counter,
                summary.elapsed,
                memory
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<RunSummary> {
    let start = driver::parse_start(args.start.as_deref())?;
    let config = Config::load(args.config.as_deref())?;
    debug!("Config loaded correctly ... {:#?}", config);
    let client = EsClient::from_config(&config).await?;
    info!(
        "Args start={}, config_path={:?}, url={}",
        start,
        args.config,
        client.get_url()
    );
    let server_info = client.print_server_info("Target").await?;
    let with_doc_type = server_info.accepts_doc_types()?;
    if !with_doc_type {
        info!(
            "Server {} has no mapping types, doc type {:?} is not sent",
            server_info.get_version(),
            config.get_doc_type()
        );
    }

    let bulk_size = usize::try_from(config.get_bulk_size()).unwrap_or(usize::MAX);
    let indexer = BulkIndexer::new(client, bulk_size, with_doc_type);

    let mut rng = StdRng::from_entropy();
    let pool = StringPool::new(config.get_pool_size(), config.get_pool_mode(), &mut rng);
    debug!(
        "Pool of {} entries ({:?}), first={:?}",
        pool.len(),
        config.get_pool_mode(),
        pool.entries().first()
    );

    let plan = RunPlan::from_config(&config, start);
    let mut driver = BenchmarkDriver::new(indexer, pool, rng, plan);
    let mut stdout = std::io::stdout();
    let summary = driver.run(&mut stdout).await?;

    let unsent = driver.into_client().get_pending();
    if unsent > 0 {
        info!("{} documents of the last partial batch were not sent", unsent);
    }
    Ok(summary)
}
