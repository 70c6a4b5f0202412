use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use miner_logging::miner_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ItemDocument;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path:?} missing or not writable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Ensure output directory exists; create it (and parents) if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let output_dir_error = |message: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        message,
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| output_dir_error(e.to_string()))?;
        if !meta.is_dir() {
            return Err(output_dir_error("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| output_dir_error(e.to_string()))?;
        miner_info!("Created directory: {:?}", dir);
    }
    Ok(())
}

/// Write `content` to `target` through a temp file in the same directory.
fn write_via_temp(target: &Path, content: &str) -> Result<(), PersistError> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target).map_err(|e| PersistError::Io(e.error))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Written(PathBuf),
    /// A document with the same content hash was already mined; nothing written.
    AlreadyExists(PathBuf),
}

/// Item documents laid out as `<root>/<type>/<hash>.json`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, document: &ItemDocument) -> PathBuf {
        self.root
            .join(&document.kind)
            .join(format!("{}.json", document.hash))
    }

    /// Writes the document unless one with the same hash exists.
    ///
    /// The existence check and the write are not atomic: two workers mining
    /// the same item at once may both write. The contents are identical.
    pub fn store(&self, document: &ItemDocument) -> Result<StoreOutcome, PersistError> {
        let target = self.path_for(document);
        if target.exists() {
            return Ok(StoreOutcome::AlreadyExists(target));
        }

        if let Some(dir) = target.parent() {
            ensure_output_dir(dir)?;
        }
        let content = serde_json::to_string_pretty(document)?;
        write_via_temp(&target, &content)?;
        Ok(StoreOutcome::Written(target))
    }
}
