use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use miner_engine::{
    CatalogPaginator, Crawler, PoolEvent, PoolProgress, ProcessSpawner, ReqwestFetcher,
    UnitStatus, WorkerPool,
};
use miner_logging::{miner_error, miner_info, miner_warn};

use crate::AppContext;

/// Relays worker output into the parent's log as each unit finishes.
struct ConsoleProgress;

impl PoolProgress for ConsoleProgress {
    fn emit(&self, event: PoolEvent) {
        let PoolEvent::Finished { unit, running } = event else {
            return;
        };
        for line in unit.output.lines().filter(|line| !line.trim().is_empty()) {
            miner_info!("[{}] {}", unit.id, line);
        }
        match unit.status {
            UnitStatus::Done => miner_info!("{} done ({} still running)", unit.id, running),
            _ => {
                let reason = unit
                    .exit
                    .as_ref()
                    .map(|exit| exit.message.as_str())
                    .unwrap_or("no exit status");
                miner_warn!("{} failed: {}", unit.id, reason);
            }
        }
    }
}

pub async fn run(
    ctx: AppContext,
    item_type: &str,
    page_count: u32,
    max_concurrency: Option<usize>,
) -> Result<ExitCode> {
    let started = Instant::now();
    let config = ctx.config;

    let mut pool_settings = config.pool.clone();
    if let Some(max) = max_concurrency {
        pool_settings.max_concurrency = max;
    }

    let paginator = CatalogPaginator::new(
        ReqwestFetcher::new(config.fetch.clone())?,
        config.wiki_base_url.as_str(),
        item_type,
    );
    let spawner = ProcessSpawner::current_exe(ctx.worker_args)?;
    let pool = WorkerPool::new(spawner, pool_settings).with_progress(Box::new(ConsoleProgress));

    miner_info!(
        "Mining {} ({} pages) from {}",
        item_type,
        page_count,
        config.wiki_base_url
    );
    let summary = Crawler::new(paginator, pool).run(page_count).await;

    for failure in &summary.failed_pages {
        miner_error!("Page {} was skipped: {}", failure.page, failure.error);
    }
    println!(
        "{}: {} pages processed, {} items found, {} mined, {} failed, peak {} workers",
        summary.item_type,
        summary.pages_processed,
        summary.units_discovered,
        summary.pool.succeeded,
        summary.pool.failed,
        summary.pool.peak_running
    );
    println!("Execution time: {:.2} seconds", started.elapsed().as_secs_f64());

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
