//! bakepay daemon: entry point for paying a baker's delegators.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bakepay_node::{init_logging, BakepayConfig, BakepayNode, LogFormat};
use bakepay_payout::{PayoutAssembler, PayoutReport, Submission};
use bakepay_rpc::HttpNodeClient;
use bakepay_types::{Cycle, Payout};
use clap::Parser;

#[derive(Parser)]
#[command(name = "bakepay", about = "Reward distribution for a Tezos baker")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "BAKEPAY_CONFIG")]
    config: Option<PathBuf>,

    /// Node RPC endpoint, e.g. "http://127.0.0.1:8732".
    #[arg(long, env = "BAKEPAY_HOST_NODE")]
    host_node: Option<String>,

    /// Baker address whose rewards are distributed.
    #[arg(long, env = "BAKEPAY_DELEGATE")]
    delegate: Option<String>,

    /// Fraction of gross rewards kept by the baker, e.g. 0.05.
    #[arg(long, env = "BAKEPAY_BAKER_FEE")]
    baker_fee: Option<f64>,

    /// Pay `cycle - preserved_cycles` once a new cycle starts.
    #[arg(long, env = "BAKEPAY_WAIT_FOR_UNFREEZE")]
    wait_for_unfreeze: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "BAKEPAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "BAKEPAY_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Watch the chain and pay every new cycle until interrupted.
    Serv,
    /// Assemble a single cycle. Prints the earnings unless `--execute` is given.
    Run {
        #[arg(long)]
        cycle: Cycle,

        /// Forge, sign and inject the payout instead of printing it.
        #[arg(long)]
        execute: bool,
    },
    /// Print the version.
    Version,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<BakepayConfig> {
        let mut config = match &self.config {
            Some(path) => BakepayConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BakepayConfig::default(),
        };
        if let Some(host_node) = &self.host_node {
            config.host_node = host_node.clone();
        }
        if let Some(delegate) = &self.delegate {
            config.delegate = delegate.clone();
        }
        if let Some(baker_fee) = self.baker_fee {
            config.payout.baker_fee = baker_fee;
        }
        if self.wait_for_unfreeze {
            config.payout.wait_for_unfreeze = true;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("bakepay {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = cli.load_config()?;
    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Serv => serve(config).await?,
        Command::Run { cycle, execute: false } => dry_run(config, cycle).await?,
        Command::Run { cycle, execute: true } => execute(config, cycle).await?,
        Command::Version => {}
    }
    Ok(())
}

async fn serve(config: BakepayConfig) -> anyhow::Result<()> {
    let mut node = BakepayNode::connect(config)?;
    let mut reports = node.take_reports().context("report channel already taken")?;
    node.start();

    let log_reports = tokio::spawn(async move {
        while let Some(report) = reports.recv().await {
            log_report(&report);
        }
    });

    let signal = node.shutdown_controller().wait_for_signal().await;
    tracing::info!(%signal, "stopping payout service");
    node.shutdown().await?;
    // The worker has exited and dropped its sender, so every report is drained.
    let _ = log_reports.await;

    tracing::info!("bakepay daemon exited cleanly");
    Ok(())
}

async fn dry_run(config: BakepayConfig, cycle: Cycle) -> anyhow::Result<()> {
    config.validate()?;
    let rpc = HttpNodeClient::new(config.host_node.clone(), config.call_timeout())?;
    let assembler = PayoutAssembler::new(Arc::new(rpc), config.assembler_config()?);
    let payout = assembler
        .assemble(cycle)
        .await
        .with_context(|| format!("assembling cycle {cycle}"))?;
    print_payout(&config, &payout);
    Ok(())
}

async fn execute(config: BakepayConfig, cycle: Cycle) -> anyhow::Result<()> {
    let mut node = BakepayNode::connect(config)?;
    node.spawn_worker();

    let payout = node
        .assembler()
        .assemble(cycle)
        .await
        .with_context(|| format!("assembling cycle {cycle}"))?;
    let report = node
        .queue()
        .enqueue_and_wait(payout)?
        .await
        .context("payout worker stopped before reporting")?;
    node.shutdown().await?;

    match report.outcome {
        Ok(Submission::Injected { operation_hash, transfers, total_amount }) => {
            println!("{operation_hash}");
            tracing::info!(cycle, transfers, total = %total_amount.to_tez_string(), "cycle paid");
            Ok(())
        }
        Ok(Submission::NothingToPay) => {
            println!("nothing to pay for cycle {cycle}");
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("paying cycle {cycle}")),
    }
}

fn print_payout(config: &BakepayConfig, payout: &Payout) {
    let filter = config.payout_filter();
    println!(
        "cycle {}  delegate {}  rewards {} tez  staking balance {} tez",
        payout.cycle,
        payout.delegate,
        payout.frozen_balance.to_tez_string(),
        payout.staking_balance.to_tez_string(),
    );
    println!(
        "{:<38} {:>8} {:>16} {:>14} {:>16}  note",
        "delegator", "share", "gross", "fee", "net"
    );
    for earning in payout.delegation_earnings.iter() {
        let note = filter
            .exclusion(earning)
            .map(|reason| format!("skipped: {reason}"))
            .unwrap_or_default();
        println!(
            "{:<38} {:>7.4}% {:>16} {:>14} {:>16}  {}",
            earning.delegator,
            earning.share * 100.0,
            earning.gross_rewards.to_tez_string(),
            earning.fee.to_tez_string(),
            earning.net_rewards.to_tez_string(),
            note,
        );
    }
    println!(
        "total net {} tez to {} delegators",
        payout.delegation_earnings.total_net().to_tez_string(),
        payout.delegation_earnings.len(),
    );
}

fn log_report(report: &PayoutReport) {
    match &report.outcome {
        Ok(Submission::Injected { operation_hash, transfers, total_amount }) => tracing::info!(
            cycle = report.cycle,
            operation = %operation_hash,
            transfers,
            total = %total_amount.to_tez_string(),
            "payout report"
        ),
        Ok(Submission::NothingToPay) => {
            tracing::info!(cycle = report.cycle, "payout report: nothing to pay")
        }
        Err(e) => tracing::error!(cycle = report.cycle, error = %e, "payout report: failed"),
    }
}
