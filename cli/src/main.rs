//! SubstRPC CLI: talk to a Substrate-style node over WebSocket JSON-RPC.
//!
//! # Commands
//! ```text
//! substrpc info
//! substrpc call    --method <name> [--params <json array>]
//! substrpc heads   [--count <N>] [--finalized]
//! substrpc address <ss58 | 0x-pubkey> [--prefix <N>]
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use substrpc_ws::Session;

mod cmd_address;
mod cmd_call;
mod cmd_heads;
mod cmd_info;
mod config;
mod tracing_setup;

use config::CliConfig;

#[derive(Parser)]
#[command(
    name = "substrpc",
    about = "JSON-RPC client for Substrate-style nodes",
    long_about = "
SubstRPC CLI: query a node, follow new heads and convert SS58 addresses.

ENVIRONMENT VARIABLES:
  SUBSTRPC_URL   Node WebSocket URL (overridden by --url)
  RUST_LOG       Log filter (overrides the config file)
",
    version
)]
struct Cli {
    /// Node WebSocket endpoint
    #[arg(long, global = true, env = "SUBSTRPC_URL")]
    url: Option<String>,

    /// JSON config file with `url`, `session` and `log` sections
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show node name, version, chain and health
    Info,

    /// Send one raw JSON-RPC request and print the result
    Call {
        /// RPC method, e.g. `chain_getHeader`
        #[arg(short, long)]
        method: String,
        /// Positional params as a JSON array
        #[arg(short, long, default_value = "[]")]
        params: String,
    },

    /// Print new block headers as they arrive
    Heads {
        /// Stop after this many headers
        #[arg(short, long, default_value_t = 5)]
        count: usize,
        /// Follow finalized heads instead of best heads
        #[arg(long)]
        finalized: bool,
    },

    /// Convert between SS58 addresses and hex public keys (offline)
    Address {
        /// SS58 address or 0x-prefixed 32-byte public key
        input: String,
        /// Network prefix used when encoding (0..=16383)
        #[arg(long, default_value_t = 42, value_parser = clap::value_parser!(u16).range(0..=0x3FFF))]
        prefix: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    if let Some(url) = cli.url.clone() {
        config.url = url;
    }
    if let Some(ms) = cli.timeout_ms {
        config.session.request_timeout_ms = ms;
    }
    if cli.verbose {
        config.log.level = "debug".into();
    }
    tracing_setup::init_tracing(&config.log);

    match cli.command {
        Commands::Info => cmd_info::run(&connect(&config).await?).await,
        Commands::Call { method, params } => cmd_call::run(&connect(&config).await?, &method, &params).await,
        Commands::Heads { count, finalized } => cmd_heads::run(&connect(&config).await?, count, finalized).await,
        Commands::Address { input, prefix } => cmd_address::run(&input, prefix),
    }
}

/// The session closes when the last handle is dropped.
async fn connect(config: &CliConfig) -> Result<Session> {
    Session::connect_ws(config.url.clone(), config.session.clone())
        .await
        .with_context(|| format!("cannot connect to {}", config.url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_prefix_is_range_checked() {
        let ok = Cli::try_parse_from(["substrpc", "address", "0x00", "--prefix", "16383"]);
        assert!(ok.is_ok());
        let too_big = Cli::try_parse_from(["substrpc", "address", "0x00", "--prefix", "20000"]);
        assert!(too_big.is_err());
    }
}
