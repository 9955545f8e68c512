use std::env;

use crate::cli::Cli;
use crate::estimator::config::{EmptyBlockPolicy, EstimatorConfig, FetchMode, DEFAULT_WINDOW_SIZE};

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub window_size: usize,
    pub empty_block_policy: EmptyBlockPolicy,
    pub fetch_mode: FetchMode,
    pub request_timeout_seconds: u64,
}

impl Config {
    /// CLI flags first, then the environment.
    pub fn load(cli: &Cli) -> Result<Self, String> {
        Self::resolve(cli, |key| env::var(key).ok())
    }

    pub fn resolve<F>(cli: &Cli, lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = cli
            .rpc_url
            .clone()
            .or_else(|| lookup("RPC_URL"))
            .filter(|url| !url.trim().is_empty())
            .ok_or("RPC_URL is required")?;

        let window_size = match cli.window.clone().or_else(|| lookup("FEE_WINDOW_BLOCKS")) {
            Some(raw) => parse_window(&raw)?,
            None => DEFAULT_WINDOW_SIZE,
        };

        let empty_block_policy = match cli
            .empty_blocks
            .clone()
            .or_else(|| lookup("FEE_EMPTY_BLOCK_POLICY"))
        {
            Some(raw) => raw.parse()?,
            None => EmptyBlockPolicy::default(),
        };

        let fetch_mode = if cli.concurrent {
            FetchMode::Concurrent
        } else {
            match lookup("FEE_FETCH_MODE") {
                Some(raw) => raw.parse()?,
                None => FetchMode::default(),
            }
        };

        let request_timeout_seconds = match cli.timeout {
            Some(seconds) => seconds,
            None => match lookup("RPC_TIMEOUT_SECONDS") {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| "RPC_TIMEOUT_SECONDS must be a valid number")?,
                None => DEFAULT_TIMEOUT_SECONDS,
            },
        };
        if request_timeout_seconds == 0 {
            return Err("RPC timeout must be at least 1 second".to_string());
        }

        Ok(Self {
            rpc_url,
            window_size,
            empty_block_policy,
            fetch_mode,
            request_timeout_seconds,
        })
    }

    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig::default()
            .with_window_size(self.window_size)
            .with_empty_block_policy(self.empty_block_policy)
            .with_fetch_mode(self.fetch_mode)
    }
}

fn parse_window(raw: &str) -> Result<usize, String> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Window size must be a whole number, got '{}'", raw))?;

    if value <= 0 {
        return Err(format!("Window size must be at least 1 block, got {}", value));
    }

    usize::try_from(value).map_err(|_| format!("Window size {} is too large", value))
}
