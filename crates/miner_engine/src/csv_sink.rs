use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use miner_core::{Currency, ServerEvent, SessionState, Shop};
use miner_logging::miner_info;

use crate::store::ensure_output_dir;
use crate::{Listener, PersistError, SinkError};

pub const SHOPS_FILE: &str = "shops.csv";
pub const ITEMS_FILE: &str = "items.csv";

pub const SHOP_HEADER: [&str; 5] = ["id", "name", "type", "memberOnly", "itemCount"];
pub const ITEM_HEADER: [&str; 9] = [
    "shopId",
    "itemId",
    "name",
    "description",
    "asset_url",
    "type",
    "memberOnly",
    "coinType",
    "coinAmount",
];

/// Appends every loaded shop to `shops.csv` and its items to `items.csv`.
/// No dedupe: a shop delivered twice is written twice.
#[derive(Debug, Clone)]
pub struct ShopCsvSink {
    output_dir: PathBuf,
    game_files_url: String,
}

impl ShopCsvSink {
    pub fn new(output_dir: impl Into<PathBuf>, game_files_url: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            game_files_url: game_files_url.into(),
        }
    }

    pub fn shops_path(&self) -> PathBuf {
        self.output_dir.join(SHOPS_FILE)
    }

    pub fn items_path(&self) -> PathBuf {
        self.output_dir.join(ITEMS_FILE)
    }

    pub fn record(&self, shop: &Shop) -> Result<(), PersistError> {
        miner_info!("Processing Shop #{} - {}", shop.id, shop.name);
        ensure_output_dir(&self.output_dir)?;

        // Open both tables before writing either.
        let shops = CsvTable::open(&self.shops_path(), &SHOP_HEADER)?;
        let items = CsvTable::open(&self.items_path(), &ITEM_HEADER)?;

        let header_row = vec![
            shop.id.to_string(),
            shop.name.clone(),
            shop.kind.clone(),
            yes_no(shop.member_only),
            shop.items.len().to_string(),
        ];
        shops.append([header_row])?;

        let item_rows = shop.items.iter().map(|item| {
            vec![
                shop.id.to_string(),
                item.id.to_string(),
                item.name.clone(),
                item.description.clone(),
                item.asset_path
                    .as_deref()
                    .filter(|path| !path.is_empty())
                    .map(|path| format!("{}{}", self.game_files_url, path))
                    .unwrap_or_default(),
                item.kind.clone(),
                yes_no(item.member_only),
                match item.currency {
                    Currency::AdventureCoins => "AC".to_string(),
                    Currency::Coins => "COINS".to_string(),
                },
                item.cost.to_string(),
            ]
        });
        let written = items.append(item_rows)?;
        miner_info!("{} items saved to {:?}", written, self.items_path());
        Ok(())
    }
}

impl Listener for ShopCsvSink {
    fn listen(&mut self, event: &ServerEvent, _session: &SessionState) -> Result<(), SinkError> {
        if let ServerEvent::ShopLoaded(shop) = event {
            self.record(shop)?;
        }
        Ok(())
    }
}

fn yes_no(flag: bool) -> String {
    let label = if flag { "YES" } else { "NO" };
    label.to_string()
}

/// A `;`-separated file opened for appending; `header` goes in first when empty.
struct CsvTable<'a> {
    file: File,
    header: &'a [&'a str],
    is_empty: bool,
}

impl<'a> CsvTable<'a> {
    fn open(path: &Path, header: &'a [&'a str]) -> Result<Self, PersistError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_empty = file.metadata()?.len() == 0;
        Ok(Self {
            file,
            header,
            is_empty,
        })
    }

    fn append(self, rows: impl IntoIterator<Item = Vec<String>>) -> Result<usize, PersistError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_writer(self.file);
        if self.is_empty {
            writer.write_record(self.header)?;
        }
        let mut written = 0;
        for row in rows {
            writer.write_record(&row)?;
            written += 1;
        }
        writer.flush()?;
        Ok(written)
    }
}
