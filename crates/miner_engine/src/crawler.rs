use miner_logging::{miner_error, miner_info};

use crate::catalog::clamp_page_count;
use crate::{CatalogPaginator, FetchError, Fetcher, PoolSummary, Spawner, WorkerPool};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub page: u32,
    pub error: FetchError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub item_type: String,
    pub pages_requested: u32,
    pub pages_processed: u32,
    pub failed_pages: Vec<PageFailure>,
    pub units_discovered: usize,
    pub pool: PoolSummary,
}

impl CrawlSummary {
    /// Every page fetched and every unit finished cleanly.
    pub fn is_success(&self) -> bool {
        self.failed_pages.is_empty() && self.pool.failed == 0
    }
}

/// Feeds slugs from the catalog listing into the worker pool, page by page.
///
/// Units from page N are started before page N+1 is fetched, so workers run
/// while the next listing page downloads.
pub struct Crawler<F: Fetcher, S: Spawner> {
    paginator: CatalogPaginator<F>,
    pool: WorkerPool<S>,
}

impl<F: Fetcher, S: Spawner> Crawler<F, S> {
    pub fn new(paginator: CatalogPaginator<F>, pool: WorkerPool<S>) -> Self {
        Self { paginator, pool }
    }

    pub async fn run(&mut self, requested_pages: u32) -> CrawlSummary {
        let pages = clamp_page_count(requested_pages);
        if pages < requested_pages {
            miner_info!(
                "Requested {} pages, capping at {}",
                requested_pages,
                pages
            );
        }

        let mut failed_pages = Vec::new();
        let mut pages_processed = 0;
        let mut units_discovered = 0;

        for page in 1..=pages {
            miner_info!(
                "Processing page {} of {}",
                page,
                self.paginator.page_url(page)
            );
            match self.paginator.fetch_page(page).await {
                Ok(slugs) => {
                    units_discovered += slugs.len();
                    for slug in slugs {
                        self.pool.submit(slug);
                    }
                    pages_processed += 1;
                    self.pool.pump().await;
                }
                Err(error) => {
                    miner_error!("Failed to fetch page {}: {}", page, error);
                    failed_pages.push(PageFailure { page, error });
                }
            }
        }

        let pool = self.pool.run().await;
        miner_info!(
            "Crawl of {} finished: {} units, {} succeeded, {} failed",
            self.paginator.item_type(),
            pool.total(),
            pool.succeeded,
            pool.failed
        );

        CrawlSummary {
            item_type: self.paginator.item_type().to_string(),
            pages_requested: requested_pages,
            pages_processed,
            failed_pages,
            units_discovered,
            pool,
        }
    }
}
