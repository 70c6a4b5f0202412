use std::process::ExitCode;

use anyhow::{Context, Result};
use miner_engine::{DocumentStore, ItemMiner, MineOutcome, ReqwestFetcher};

use crate::AppContext;

pub async fn run(ctx: AppContext, slug: &str) -> Result<ExitCode> {
    let config = ctx.config;
    let miner = ItemMiner::new(
        ReqwestFetcher::new(config.fetch.clone())?,
        DocumentStore::new(config.items_dir()),
        config.wiki_base_url.as_str(),
    );

    let outcome = miner
        .mine(slug)
        .await
        .with_context(|| format!("failed to mine {slug}"))?;
    match outcome {
        MineOutcome::Written { path, .. } => println!("{}", path.display()),
        MineOutcome::AlreadyExists { path } => println!("{} (unchanged)", path.display()),
    }
    Ok(ExitCode::SUCCESS)
}
