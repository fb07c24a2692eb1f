//! RON catalog loading.

use std::path::Path;

use anyhow::Context;

use crate::catalog::Catalog;

/// Loader for catalogs authored as RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse a catalog from RON text.
    pub fn from_str(content: &str) -> anyhow::Result<Catalog> {
        ron::from_str(content).context("failed to parse catalog RON")
    }

    /// Load a catalog from a RON file on disk.
    pub fn load(path: &Path) -> anyhow::Result<Catalog> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog file {}", path.display()))?;
        Self::from_str(&content)
    }
}
