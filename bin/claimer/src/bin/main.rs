//! Finalize an L2→L1 withdrawal on L1 from the hash of the L2 transaction that sent it.

use action::{
    finalize::{Finalize, FinalizeAction},
    Action,
};
use alloy_primitives::TxHash;
use alloy_provider::Provider;
use claimer::{
    build_assembler,
    config::Config,
    log_checkpoint_block, log_resolution,
    metrics::{install_prometheus_exporter, Metrics},
    resolve_withdrawal,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "claimer")]
#[command(about = "Resolve and finalize an L2→L1 withdrawal")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Private key for signing transactions (hex string, with or without 0x prefix)
    #[arg(short = 'k', long, env = "PRIVATE_KEY")]
    private_key: Option<String>,

    /// Dry-run mode: resolve and print the withdrawal without submitting it
    #[arg(long)]
    dry_run: bool,

    /// Poll until an output proposal covers the withdrawal
    #[arg(long)]
    wait: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Hash of the L2 transaction that sent the message
    tx_hash: TxHash,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = Config::from_file(&cli.config)?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.dry_run = true;
    }

    let addresses = config.contract_addresses()?;

    info!("Loaded config:");
    info!("  L1 RPC URL: {}", config.l1_rpc_url);
    info!("  L2 RPC URL: {}", config.l2_rpc_url);
    info!("  Deployment: {}", config.deployment);
    info!("  L2OutputOracle: {}", addresses.l2_output_oracle);
    info!("  OptimismPortal: {}", addresses.optimism_portal);
    info!("  Dry run: {}", config.dry_run);

    if let Some(port) = config.metrics_port {
        install_prometheus_exporter(port)?;
        info!(port, "Prometheus exporter listening");
    }
    let metrics = Metrics::new();

    let l1_provider = client::create_provider(&config.l1_rpc_url)?;
    let l2_provider = client::create_provider(&config.l2_rpc_url)?;

    let assembler = build_assembler(l1_provider.clone(), l2_provider.clone(), &config)?;
    let poll_interval = cli.wait.then(|| config.poll_interval());

    let resolution = resolve_withdrawal(&assembler, cli.tx_hash, poll_interval, &metrics).await?;
    log_resolution(&resolution);

    if let Err(e) = log_checkpoint_block(&l2_provider, resolution.checkpoint.l2_block_number).await
    {
        warn!(error = %e, "Failed to fetch checkpoint block");
    }

    if config.dry_run {
        info!("[DRY RUN] Would finalize withdrawal {}", resolution.withdrawal_hash);
        return Ok(());
    }

    let Some(private_key) = cli.private_key else {
        eyre::bail!("A private key is required to finalize, pass --private-key or set PRIVATE_KEY");
    };

    let from = client::parse_private_key(&private_key)?.address();
    let chain_id = l1_provider.get_chain_id().await?;
    let signer = client::local_signer_fn(&private_key, chain_id, l1_provider.clone())?;

    let finalize = Finalize {
        portal_address: addresses.optimism_portal,
        l2_tx_hash: cli.tx_hash,
        from,
    };
    let withdrawal_hash = resolution.withdrawal_hash;
    let mut action =
        FinalizeAction::new(l1_provider, assembler, signer, finalize).with_resolution(resolution);

    if action.is_completed().await? {
        info!(%withdrawal_hash, "Withdrawal already finalized");
        return Ok(());
    }

    info!("{}", action.description());
    let result = action.execute().await?;
    metrics.record_withdrawal_finalized();

    info!(
        tx_hash = %result.tx_hash,
        block_number = ?result.block_number,
        "Done"
    );

    Ok(())
}
