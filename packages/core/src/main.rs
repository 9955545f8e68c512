use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;

use fee_bid_estimator::cli::Cli;
use fee_bid_estimator::config::Config;
use fee_bid_estimator::error::AppError;
use fee_bid_estimator::estimator::{EstimationReport, FeeEstimator, RpcBlockDataProvider};
use fee_bid_estimator::logging::init_logging;
use fee_bid_estimator::services::rpc::RpcClient;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "info" });

    if let Err(err) = run(&cli).await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let config = Config::load(cli).map_err(AppError::Config)?;
    tracing::debug!("Loaded config: {:?}", config);

    // Validates the window before any request is sent
    let estimator = FeeEstimator::new(config.estimator_config())?;

    let client = RpcClient::with_timeout(
        config.rpc_url.clone(),
        Duration::from_secs(config.request_timeout_seconds),
    )
    .map_err(|err| AppError::Network(err.to_string()))?;
    let provider = RpcBlockDataProvider::new(client);

    let report = estimator.estimate_with_report(&provider).await?;

    if cli.json {
        let body = serde_json::to_string_pretty(&report)
            .map_err(|err| AppError::Parse(err.to_string()))?;
        println!("{}", body);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &EstimationReport) {
    println!(
        "Blocks {}..{} ({} with fee-market txs), pending base fee {} gwei",
        report.latest_block_number - report.blocks.len() as u64,
        report.latest_block_number,
        report.sampled_blocks,
        gwei(report.pending_base_fee_per_gas),
    );
    println!("  slow:    {} wei ({} gwei)", report.estimate.slow, gwei(report.estimate.slow));
    println!("  average: {} wei ({} gwei)", report.estimate.average, gwei(report.estimate.average));
    println!("  fast:    {} wei ({} gwei)", report.estimate.fast, gwei(report.estimate.fast));
}

fn gwei(wei: u128) -> String {
    format!("{:.3}", wei as f64 / 1e9)
}
