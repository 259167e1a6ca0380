use std::path::PathBuf;
use std::sync::Arc;

use super::loader;
use super::model::SalesTable;
use crate::config::SourceConfig;
use crate::error::Result;

// ---------------------------------------------------------------------------
// TableCache – load once, share for the session
// ---------------------------------------------------------------------------

/// Holds the loaded table for the lifetime of the process.
///
/// No expiry: the table is only dropped by [`TableCache::invalidate`],
/// [`TableCache::reload`] or by pointing the cache at another source.
#[derive(Debug)]
pub struct TableCache {
    source: SourceConfig,
    table: Option<Arc<SalesTable>>,
}

impl TableCache {
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            table: None,
        }
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    /// The cached table, loading it on first access.  A failed load leaves
    /// the cache empty so the next call retries.
    pub fn get(&mut self) -> Result<Arc<SalesTable>> {
        if let Some(table) = &self.table {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(loader::load(&self.source)?);
        self.table = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Read-only accessor; never triggers a load.
    pub fn cached(&self) -> Option<Arc<SalesTable>> {
        self.table.clone()
    }

    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            log::debug!("Invalidated cached table for {}", self.source.path.display());
        }
    }

    pub fn reload(&mut self) -> Result<Arc<SalesTable>> {
        self.invalidate();
        self.get()
    }

    /// Switch to a different file with the same sheet layout.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.source = self.source.with_path(path);
        self.invalidate();
    }
}
