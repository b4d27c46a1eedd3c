//! swapcheck CLI: reconstruct a DEX router swap from a transaction hash.
//!
//! # Commands
//! ```text
//! swapcheck check <TX_HASH> [--rpc <url>] [--nodes <file>] [--routers <file>] [--json] [--attempts <n>]
//! swapcheck networks [--nodes <file>]
//! swapcheck routers  [--routers <file>]
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use swapcheck_core::{NodeRegistry, QuotePolicy, RouterRegistry, SwapChecker};
use swapcheck_rpc::RpcConnector;

mod logging;
mod output;

use logging::LogConfig;

#[derive(Parser)]
#[command(
    name = "swapcheck",
    about = "Reconstruct a DEX swap (tokens, direction, amounts, fee) from a transaction hash",
    long_about = "
swapcheck finds which registered network holds a transaction, decodes it as a
Uniswap-V2-style router call and rebuilds the swap from the pair Swap events:
raw amounts, base-asset (WETH/WBNB/...) amounts, USDT amounts and fee estimates.

ENVIRONMENT VARIABLES:
  SWAPCHECK_NODES     Node registry JSON file (default: bundled)
  SWAPCHECK_ROUTERS   Router registry JSON file (default: bundled)
",
    version
)]
struct Cli {
    /// Enable debug logging (same as --log-level debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Global log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Per-crate override, e.g. swapcheck_rpc=trace (repeatable)
    #[arg(long = "log-component", global = true, value_name = "CRATE=LEVEL")]
    log_components: Vec<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the swap in a transaction
    Check {
        /// Transaction hash (0x-prefixed)
        tx_hash: String,
        /// Query only this RPC endpoint instead of every registered network
        #[arg(long)]
        rpc: Option<String>,
        /// Node registry JSON file
        #[arg(long, env = "SWAPCHECK_NODES")]
        nodes: Option<String>,
        /// Router registry JSON file
        #[arg(long, env = "SWAPCHECK_ROUTERS")]
        routers: Option<String>,
        /// Output the full report as JSON
        #[arg(long)]
        json: bool,
        /// Historical-block attempts per price quote
        #[arg(long, default_value_t = 5)]
        attempts: u32,
    },

    /// List the registered networks
    Networks {
        #[arg(long, env = "SWAPCHECK_NODES")]
        nodes: Option<String>,
    },

    /// List the registered routers
    Routers {
        #[arg(long, env = "SWAPCHECK_ROUTERS")]
        routers: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&log_config(&cli)?);

    match cli.command {
        Commands::Check {
            tx_hash,
            rpc,
            nodes,
            routers,
            json,
            attempts,
        } => {
            cmd_check(
                &tx_hash,
                rpc.as_deref(),
                nodes.as_deref(),
                routers.as_deref(),
                json,
                attempts,
            )
            .await
        }
        Commands::Networks { nodes } => cmd_networks(nodes.as_deref()),
        Commands::Routers { routers } => cmd_routers(routers.as_deref()),
    }
}

fn log_config(cli: &Cli) -> Result<LogConfig> {
    let mut config = LogConfig {
        level: if cli.verbose {
            "debug".into()
        } else {
            cli.log_level.clone()
        },
        json: cli.log_json,
        ..LogConfig::default()
    };
    for entry in &cli.log_components {
        let (component, level) = entry
            .split_once('=')
            .with_context(|| format!("--log-component expects CRATE=LEVEL, got '{entry}'"))?;
        config
            .components
            .insert(component.trim().to_string(), level.trim().to_string());
    }
    Ok(config)
}

fn load_nodes(path: Option<&str>) -> Result<NodeRegistry> {
    match path {
        Some(p) => NodeRegistry::from_file(Path::new(p))
            .with_context(|| format!("load node registry '{p}'")),
        None => NodeRegistry::bundled().context("load bundled node registry"),
    }
}

fn load_routers(path: Option<&str>) -> Result<RouterRegistry> {
    match path {
        Some(p) => RouterRegistry::from_file(Path::new(p))
            .with_context(|| format!("load router registry '{p}'")),
        None => RouterRegistry::bundled().context("load bundled router registry"),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

async fn cmd_check(
    tx_hash: &str,
    rpc: Option<&str>,
    nodes: Option<&str>,
    routers: Option<&str>,
    as_json: bool,
    attempts: u32,
) -> Result<()> {
    let nodes = load_nodes(nodes)?;
    let routers = load_routers(routers)?;
    tracing::debug!(networks = nodes.len(), routers = routers.len(), "registries loaded");

    let mut checker = SwapChecker::new(nodes, routers, Arc::new(RpcConnector::default()))?
        .with_quote_policy(QuotePolicy {
            historical_attempts: attempts,
            ..QuotePolicy::default()
        });
    if let Some(endpoint) = rpc {
        checker = checker.with_rpc(endpoint);
    }

    let report = checker
        .reconstruct(tx_hash)
        .await
        .with_context(|| format!("reconstruct swap in {tx_hash}"))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", output::render_report(&report));
    }
    Ok(())
}

fn cmd_networks(nodes: Option<&str>) -> Result<()> {
    let nodes = load_nodes(nodes)?;
    println!("{:<10} {:<20} RPC", "CHAIN ID", "NAME");
    for chain in nodes.iter() {
        println!("{:<10} {:<20} {}", chain.chain_id, chain.name, chain.rpc);
    }
    Ok(())
}

fn cmd_routers(routers: Option<&str>) -> Result<()> {
    let routers = load_routers(routers)?;
    for router in routers.iter() {
        println!("{}", output::render_router(router));
    }
    Ok(())
}
