//! agora: reconstruct governor proposals from chain logs and view calls.

mod commands;
mod config;
mod render;
mod shutdown;

use std::path::PathBuf;
use std::sync::Arc;

use agora_governance::{FilterCriteria, SortField, SortOrder};
use agora_ledger::GovernanceLedger;
use agora_rpc::EthRpcLedger;
use agora_types::{Address, ProposalCategory, ProposalState};
use agora_utils::{init_logging, LogFormat};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::commands::Output;
use crate::config::{ClientConfig, ConfigOverrides};
use crate::shutdown::ShutdownController;

#[derive(Parser, Debug)]
#[command(name = "agora", version, about = "Governance proposal explorer for an on-chain governor")]
struct Cli {
    /// JSON-RPC endpoint of the chain.
    #[arg(long, env = "AGORA_RPC_URL")]
    rpc_url: Option<String>,

    /// Governor contract address.
    #[arg(long, env = "AGORA_GOVERNOR")]
    governor: Option<Address>,

    /// Maximum per-proposal fetches in flight during a pass.
    #[arg(long, env = "AGORA_MAX_CONCURRENT_FETCHES")]
    max_concurrent_fetches: Option<usize>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "AGORA_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Block polling interval for `watch`, in milliseconds.
    #[arg(long, env = "AGORA_POLL_INTERVAL_MS")]
    poll_interval_ms: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level filter; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read proposals once.
    Proposals {
        #[command(subcommand)]
        action: ProposalsAction,
    },
    /// Re-render the proposal list on every governance event until interrupted.
    Watch(ViewArgs),
}

#[derive(Subcommand, Debug)]
enum ProposalsAction {
    /// List proposals, newest first unless a sort is given.
    List(ViewArgs),
    /// Summary counts and participation over all proposals.
    Analytics {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct ViewArgs {
    /// Finance, Protocol, Community or Emergency.
    #[arg(long)]
    category: Option<ProposalCategory>,

    /// Lifecycle state, by name or code.
    #[arg(long)]
    status: Option<ProposalState>,

    /// Case-insensitive text to find in title or description.
    #[arg(long, default_value = "")]
    search: String,

    /// createdAt, forVotes, againstVotes or title.
    #[arg(long, default_value = "createdAt")]
    sort_by: String,

    /// asc or desc.
    #[arg(long, default_value = "desc")]
    order: String,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl ViewArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            category: self.category,
            status: self.status,
            search: self.search.clone(),
            sort_by: SortField::from_name(&self.sort_by),
            sort_order: SortOrder::from_name(&self.order),
        }
    }

    fn output(&self) -> Output {
        output(self.json)
    }
}

fn output(json: bool) -> Output {
    if json {
        Output::Json
    } else {
        Output::Text
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let base = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    let log_format = cli
        .log_format
        .as_deref()
        .map(str::parse::<LogFormat>)
        .transpose()?;
    Ok(base.apply(ConfigOverrides {
        rpc_url: cli.rpc_url.clone(),
        governor_address: cli.governor,
        max_concurrent_fetches: cli.max_concurrent_fetches,
        request_timeout_secs: cli.request_timeout_secs,
        poll_interval_ms: cli.poll_interval_ms,
        log_format,
        log_level: cli.log_level.clone(),
    })?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(config.log_format, &config.log_level)?;

    tracing::info!(
        rpc_url = %config.rpc_url,
        governor = %config.governor_address,
        "connecting to governor"
    );
    let ledger: Arc<dyn GovernanceLedger> = Arc::new(EthRpcLedger::new(
        config.rpc_url.clone(),
        config.governor_address,
        config.rpc_options(),
    )?);
    let pipeline = config.pipeline_options();

    match cli.command {
        Command::Proposals { action } => {
            let rendered = match action {
                ProposalsAction::List(args) => {
                    commands::list(ledger.as_ref(), &pipeline, &args.criteria(), args.output()).await?
                }
                ProposalsAction::Analytics { json } => {
                    commands::analytics(ledger.as_ref(), &pipeline, output(json)).await?
                }
            };
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
        Command::Watch(args) => {
            let shutdown = Arc::new(ShutdownController::new());
            let signals = {
                let shutdown = shutdown.clone();
                tokio::spawn(async move { shutdown.wait_for_signal().await })
            };
            commands::watch(
                ledger,
                pipeline,
                args.criteria(),
                args.output(),
                shutdown.sender(),
                |view| println!("{view}"),
            )
            .await?;
            signals.abort();
            tracing::info!("agora exited cleanly");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn list_flags_build_criteria() {
        let cli = Cli::try_parse_from([
            "agora",
            "proposals",
            "list",
            "--category",
            "community",
            "--status",
            "Active",
            "--search",
            "treasury",
            "--sort-by",
            "forVotes",
            "--order",
            "asc",
        ])
        .unwrap();
        let Command::Proposals { action: ProposalsAction::List(args) } = cli.command else {
            panic!("expected proposals list");
        };
        let criteria = args.criteria();
        assert_eq!(criteria.category, Some(ProposalCategory::Community));
        assert_eq!(criteria.status, Some(ProposalState::Active));
        assert_eq!(criteria.search, "treasury");
        assert_eq!(criteria.sort_by, SortField::ForVotes);
        assert_eq!(criteria.sort_order, SortOrder::Asc);
        assert_eq!(args.output(), Output::Text);
    }

    #[test]
    fn unknown_sort_falls_back_to_created_at() {
        let cli = Cli::try_parse_from(["agora", "watch", "--sort-by", "hotness", "--json"]).unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.criteria().sort_by, SortField::CreatedAt);
        assert_eq!(args.criteria().sort_order, SortOrder::Desc);
        assert_eq!(args.output(), Output::Json);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "agora",
            "--rpc-url",
            "http://10.1.1.1:8545",
            "--max-concurrent-fetches",
            "3",
            "--log-format",
            "json",
            "proposals",
            "analytics",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.rpc_url, "http://10.1.1.1:8545");
        assert_eq!(config.max_concurrent_fetches, 3);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.poll_interval_ms, 2000);
    }

    #[test]
    fn bad_governor_is_rejected_by_clap() {
        assert!(Cli::try_parse_from(["agora", "--governor", "0xnope", "proposals", "analytics"]).is_err());
    }
}
