use std::path::PathBuf;

use miner_logging::{miner_info, miner_warn};

use crate::catalog::join_url;
use crate::{
    DocumentStore, FetchError, Fetcher, FieldExtractor, ItemDocument, PersistError,
    StoreOutcome, WikiFieldExtractor,
};

#[derive(Debug, thiserror::Error)]
pub enum MineError {
    #[error("failed to fetch item page: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to save item document: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MineOutcome {
    Written { path: PathBuf, document: ItemDocument },
    AlreadyExists { path: PathBuf },
}

/// Mines a single wiki item page into the document store.
pub struct ItemMiner<F: Fetcher> {
    fetcher: F,
    extractor: Box<dyn FieldExtractor>,
    store: DocumentStore,
    wiki_base_url: String,
}

impl<F: Fetcher> ItemMiner<F> {
    pub fn new(fetcher: F, store: DocumentStore, wiki_base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            extractor: Box::new(WikiFieldExtractor),
            store,
            wiki_base_url: wiki_base_url.into(),
        }
    }

    pub fn with_extractor(mut self, extractor: Box<dyn FieldExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn item_url(&self, slug: &str) -> String {
        join_url(&self.wiki_base_url, slug)
    }

    pub async fn mine(&self, slug: &str) -> Result<MineOutcome, MineError> {
        let url = self.item_url(slug);
        miner_info!("Fetching {} information on {}", slug, url);

        let page = self.fetcher.fetch(&url).await?;
        let fields = self.extractor.extract(&page.body, slug);
        if fields.name.is_none() {
            miner_warn!("{}: page title not found", slug);
        }
        if fields.description.is_none() {
            miner_warn!("{}: description not found", slug);
        }
        if fields.kind.is_none() {
            miner_warn!("{}: item type not found in breadcrumbs", slug);
        }

        let document = ItemDocument::new(slug, &url, fields);
        match self.store.store(&document)? {
            StoreOutcome::Written(path) => {
                miner_info!("Successfully saved item data to {:?}", path);
                Ok(MineOutcome::Written { path, document })
            }
            StoreOutcome::AlreadyExists(path) => {
                miner_info!("Item already exists. Skipping save: {:?}", path);
                Ok(MineOutcome::AlreadyExists { path })
            }
        }
    }
}
