//! Miner engine: fetching, parsing, persistence, the worker pool and the
//! session driver.
mod catalog;
mod config;
mod crawler;
mod csv_sink;
mod document;
mod extract;
mod fetch;
mod miner;
mod pool;
mod process;
mod relay;
mod session;
mod store;
mod types;

pub use catalog::{
    catalog_page_url, clamp_page_count, parse_catalog_page, CatalogPaginator, MAX_PAGE_COUNT,
};
pub use config::{ConfigError, MinerConfig, DEFAULT_GAME_FILES_URL, DEFAULT_WIKI_URL};
pub use crawler::{CrawlSummary, Crawler, PageFailure};
pub use csv_sink::{ShopCsvSink, ITEMS_FILE, ITEM_HEADER, SHOPS_FILE, SHOP_HEADER};
pub use document::{content_hash, ItemDocument, UNKNOWN_TYPE};
pub use extract::{classify_type, clean_text, FieldExtractor, ItemFields, ItemTag, WikiFieldExtractor};
pub use fetch::{FetchSettings, FetchedPage, Fetcher, ReqwestFetcher};
pub use miner::{ItemMiner, MineError, MineOutcome};
pub use pool::{
    FinishedWork, PoolEvent, PoolProgress, PoolSettings, PoolSummary, SpawnError, Spawner,
    WorkerHandle, WorkerPool,
};
pub use process::{ProcessHandle, ProcessSpawner};
pub use relay::{JsonLinesTransport, TcpRelayTransport};
pub use session::{
    Listener, Pacer, SessionReport, SessionRunner, SessionSettings, SessionTransport, SinkError,
    SleepPacer, TransportError,
};
pub use store::{ensure_output_dir, DocumentStore, PersistError, StoreOutcome};
pub use types::{FailureKind, FetchError, UnitExit, UnitId, UnitStatus, WorkUnit};
