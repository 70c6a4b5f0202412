use miner_logging::miner_info;
use scraper::{Html, Selector};

use crate::{FetchError, Fetcher};

/// Upper bound on listing pages walked by one crawl.
pub const MAX_PAGE_COUNT: u32 = 30;

pub fn clamp_page_count(requested: u32) -> u32 {
    requested.min(MAX_PAGE_COUNT)
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// `<base>/<item_type>/p/<page>`
pub fn catalog_page_url(base: &str, item_type: &str, page: u32) -> String {
    join_url(base, &format!("{}/p/{page}", item_type.trim_matches('/')))
}

/// Item slugs linked from a catalog listing page, in page order.
pub fn parse_catalog_page(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(".list-pages-item > p > a") else {
        return Vec::new();
    };
    Html::parse_document(html)
        .select(&selector)
        .filter_map(|link| link.value().attr("href"))
        .map(|href| href.trim().trim_start_matches('/').to_string())
        .filter(|slug| !slug.is_empty())
        .collect()
}

/// Walks the listing pages of one item type.
pub struct CatalogPaginator<F: Fetcher> {
    fetcher: F,
    base_url: String,
    item_type: String,
}

impl<F: Fetcher> CatalogPaginator<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            item_type: item_type.into(),
        }
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn page_url(&self, page: u32) -> String {
        catalog_page_url(&self.base_url, &self.item_type, page)
    }

    /// Fetch one listing page and return its item slugs. An empty page is not an error.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<String>, FetchError> {
        let url = self.page_url(page);
        let fetched = self.fetcher.fetch(&url).await?;
        let slugs = parse_catalog_page(&fetched.body);
        miner_info!("Found {} items on {}", slugs.len(), url);
        Ok(slugs)
    }
}
