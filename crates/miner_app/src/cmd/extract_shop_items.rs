use std::process::ExitCode;

use anyhow::{Context, Result};
use miner_core::{parse_shop_ids, Phase};
use miner_engine::{SessionRunner, ShopCsvSink, TcpRelayTransport};
use miner_logging::{miner_info, miner_warn};

use crate::AppContext;

pub fn run(ctx: AppContext, relay_addr: &str, shop_ids: &str) -> Result<ExitCode> {
    let config = ctx.config;
    let targets = parse_shop_ids(shop_ids)?;
    if targets.is_empty() {
        miner_warn!("No shop ids given, the session will only log in");
    }

    let sink = ShopCsvSink::new(&config.output_dir, config.game_files_url.as_str());
    miner_info!(
        "Writing shops to {:?} and items to {:?}",
        sink.shops_path(),
        sink.items_path()
    );

    let mut runner = SessionRunner::new(targets, config.session.clone());
    runner.register(Box::new(sink));

    let mut transport = TcpRelayTransport::new(relay_addr);
    let report = runner
        .run(&mut transport)
        .with_context(|| format!("session with {relay_addr} failed"))?;

    println!(
        "{} shops requested, {} events seen, {} listener failures",
        report.shops_requested.len(),
        report.events_seen,
        report.sink_failures
    );
    if report.final_phase != Phase::Exhausted {
        miner_warn!("Connection closed before every shop was loaded");
    }
    Ok(ExitCode::SUCCESS)
}
