//! File indexing on top of `bloom_core`: every line of a file is shingled into
//! one Bloom array per file, cached on disk, and compared against the array of
//! a set of search expressions.
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod source;
pub mod store;
pub mod utils;

pub use config::IndexConfig;
pub use errors::{IndexError, Result};
pub use fingerprint::{may_match, normalize_line, Fingerprinter};
pub use store::ArrayStore;

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    UpToDate,
    Indexed,
}

pub struct Indexer {
    fingerprinter: Fingerprinter,
    store: ArrayStore,
}

impl Indexer {
    pub fn new(config: IndexConfig, store: ArrayStore) -> Result<Self> {
        Ok(Self { fingerprinter: Fingerprinter::new(config)?, store })
    }

    pub fn config(&self) -> &IndexConfig {
        self.fingerprinter.config()
    }

    pub fn store(&self) -> &ArrayStore {
        &self.store
    }

    fn cache_key(&self, path: &Path) -> Result<(PathBuf, String)> {
        let resolved = path.canonicalize()?;
        let meta = std::fs::metadata(&resolved)?;
        let mtime = utils::mtime_nanos(meta.modified()?);
        Ok((resolved, self.config().cache_key(meta.len(), mtime)))
    }

    fn cached(&self, resolved: &Path, key: &str) -> Result<Option<Vec<u8>>> {
        match self.store.get(resolved, key) {
            Err(e @ (IndexError::BadHeader | IndexError::Corrupt)) => {
                warn!("Discarding cache entry for {}: {e}", resolved.display());
                Ok(None)
            }
            other => other,
        }
    }

    /// Cached array for `path`, building and storing it first when the cache
    /// is missing, stale or unreadable.
    pub fn file_array(&self, path: &Path) -> Result<(Vec<u8>, IndexOutcome)> {
        let (resolved, key) = self.cache_key(path)?;
        if let Some(array) = self.cached(&resolved, &key)? {
            debug!("File is up-to-date: {}", path.display());
            return Ok((array, IndexOutcome::UpToDate));
        }
        info!("Indexing file: {}", path.display());
        let array = self.fingerprinter.file_array(source::open_lines(&resolved)?)?;
        self.store.put(&resolved, &key, &array)?;
        Ok((array, IndexOutcome::Indexed))
    }

    pub fn index_file(&self, path: &Path) -> Result<IndexOutcome> {
        self.file_array(path).map(|(_, outcome)| outcome)
    }

    /// Whether `path` may contain every expression. Unindexed files are
    /// indexed on the way.
    pub fn match_file<S: AsRef<str>>(&self, path: &Path, expressions: &[S]) -> Result<bool> {
        let (file_array, _) = self.file_array(path)?;
        let match_array = self.fingerprinter.match_array(expressions, file_array.len())?;
        let hit = may_match(&match_array, &file_array)?;
        if hit {
            debug!("File possibly matching: {}", path.display());
        } else {
            debug!("File does not match: {}", path.display());
        }
        Ok(hit)
    }
}
