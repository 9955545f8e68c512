use clap::Parser;

/// Fee bid estimator CLI arguments
#[derive(Debug, Default, Parser)]
#[command(
    name = "fee-bid-estimator",
    version,
    about = "Estimate slow/average/fast fee bids from recent blocks"
)]
pub struct Cli {
    /// JSON-RPC endpoint of an execution client
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Number of recent confirmed blocks to sample
    #[arg(long, allow_hyphen_values = true)]
    pub window: Option<String>,

    /// How blocks without fee-market transactions count (skip or zero)
    #[arg(long)]
    pub empty_blocks: Option<String>,

    /// Fetch the sampled blocks concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the full estimation report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}
