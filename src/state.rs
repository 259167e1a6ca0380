use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use rusty_sales::config::DashboardConfig;
use rusty_sales::data::cache::TableCache;
use rusty_sales::data::filter::{FilterSelection, full_selection};
use rusty_sales::data::model::{CellValue, Dimension, SalesTable};
use rusty_sales::error::Result;
use rusty_sales::report::dashboard::{self, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    cache: TableCache,

    /// Table the current view was computed from.
    pub table: Arc<SalesTable>,

    /// Per-dimension filter selections.
    pub selection: FilterSelection,

    /// Derived results for `selection` (recomputed on every change).
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load the configured source.  Failing here is fatal: there is no
    /// dashboard without data.
    pub fn load(config: DashboardConfig) -> Result<Self> {
        let mut cache = TableCache::new(config.source.clone());
        let table = cache.get()?;
        let mut state = AppState {
            config,
            cache,
            table: Arc::new(SalesTable::default()),
            selection: FilterSelection::new(),
            view: None,
            status_message: None,
        };
        state.set_table(table);
        Ok(state)
    }

    /// Ingest a (re)loaded table: select everything and recompute.
    pub fn set_table(&mut self, table: Arc<SalesTable>) {
        self.selection = full_selection(&table);
        self.table = table;
        self.status_message = None;
        self.recompute();
    }

    /// Switch to another file.  On failure the current table stays.
    pub fn open_path(&mut self, path: PathBuf) {
        let previous = self.cache.source().path.clone();
        self.cache.set_path(path);
        match self.cache.get() {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.cache.set_path(previous);
            }
        }
    }

    /// Drop the cached table and read the source again.
    pub fn reload(&mut self) {
        match self.cache.reload() {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Reload failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn source_path(&self) -> &std::path::Path {
        &self.cache.source().path
    }

    /// Recompute the view for the current selection.
    fn recompute(&mut self) {
        match dashboard::compute(&self.table, &self.selection, &self.config.display) {
            Ok(view) => self.view = Some(view),
            Err(e) => {
                log::warn!("Recompute failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Replace the selection if it is valid for the loaded table;
    /// otherwise keep the previous one and report why.
    pub fn apply_selection(&mut self, candidate: FilterSelection) -> Result<()> {
        match dashboard::compute(&self.table, &candidate, &self.config.display) {
            Ok(view) => {
                self.selection = candidate;
                self.view = Some(view);
                self.status_message = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected selection: {e}");
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_value(&mut self, dimension: Dimension, value: &CellValue) -> Result<()> {
        let mut candidate = self.selection.clone();
        let selected = candidate.entry(dimension).or_default();
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        self.apply_selection(candidate)
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dimension: Dimension) -> Result<()> {
        let mut candidate = self.selection.clone();
        candidate.insert(dimension, self.table.unique_values(dimension).clone());
        self.apply_selection(candidate)
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dimension: Dimension) -> Result<()> {
        let mut candidate = self.selection.clone();
        candidate.insert(dimension, BTreeSet::new());
        self.apply_selection(candidate)
    }

    pub fn is_selected(&self, dimension: Dimension, value: &CellValue) -> bool {
        self.selection
            .get(&dimension)
            .map_or(true, |selected| selected.contains(value))
    }
}
