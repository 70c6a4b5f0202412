use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miner_logging::{miner_info, miner_warn};
use serde::{Deserialize, Serialize};

use crate::{FetchSettings, PoolSettings, SessionSettings};

pub const DEFAULT_WIKI_URL: &str = "http://aqwwiki.wikidot.com";
pub const DEFAULT_GAME_FILES_URL: &str = "https://game.aq.com/game/gamefiles/";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Runtime configuration, loadable from a RON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    pub wiki_base_url: String,
    /// Prefix for item asset paths in the shop item table.
    pub game_files_url: String,
    pub output_dir: PathBuf,
    pub fetch: FetchSettings,
    pub pool: PoolSettings,
    pub session: SessionSettings,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            wiki_base_url: DEFAULT_WIKI_URL.to_string(),
            game_files_url: DEFAULT_GAME_FILES_URL.to_string(),
            output_dir: PathBuf::from("output"),
            fetch: FetchSettings::default(),
            pool: PoolSettings::default(),
            session: SessionSettings::default(),
        }
    }
}

impl MinerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        miner_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Like [`MinerConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                miner_warn!("Config {:?} not found, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Root of the item document tree.
    pub fn items_dir(&self) -> PathBuf {
        self.output_dir.join("items")
    }
}

/// Durations are stored as whole milliseconds.
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
