use {
    crate::{
        infra::{cli, config, ledger::InMemoryLedger},
        pool::{Ledgers, Pool},
        sim::{Scenario, Simulator},
    },
    anyhow::{Context, Result},
    clap::Parser,
    std::sync::Arc,
};

pub async fn start(args: impl IntoIterator<Item = String>) {
    let args = cli::Args::parse_from(args);
    let format = if args.log_json {
        observe::tracing::Format::Json
    } else {
        observe::tracing::Format::Text
    };
    observe::tracing::initialize(&args.log, format);
    tracing::info!("running pool simulator with {args:#?}");

    if let Err(err) = run(args).await {
        tracing::error!(?err, "simulation aborted");
        std::process::exit(1);
    }
}

async fn run(args: cli::Args) -> Result<()> {
    let config = config::load(&args.config).await?;
    let scenario = Scenario::load(&args.scenario).await?;
    tracing::debug!(fee_source = ?config.fee_source, steps = scenario.steps.len(), "loaded scenario");

    let simulator = simulator(config);
    let reports = simulator.run(&scenario).await;

    let mut failed = 0;
    for report in &reports {
        failed += usize::from(!report.is_ok());
        println!(
            "{}",
            serde_json::to_string(report).context("failed to serialize step report")?
        );
    }
    tracing::info!(steps = reports.len(), failed, "simulation finished");
    Ok(())
}

/// Sets up a pool over fresh in-memory ledgers. Only the staked token is
/// mintable, as the pool mints it on buys.
pub fn simulator(config: config::Config) -> Simulator {
    let pool_account = config.pool.pool_account;
    let native = Arc::new(InMemoryLedger::new(config.pool.native_token, pool_account));
    let staked = Arc::new(InMemoryLedger::new(config.pool.staked_token, pool_account).mintable());
    let ledgers = Ledgers {
        native: native.clone(),
        staked: staked.clone(),
    };
    Simulator {
        pool: Pool::new(config.pool, ledgers, config.fee_source),
        native,
        staked,
    }
}
