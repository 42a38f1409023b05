use super::memory::RangeCatalog;
use super::types::{RangeId, ScoreRange};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

const CATALOG_VERSION: u32 = 1;

/// Get the default catalog file path (~/.config/news-score/ranges.json)
pub fn get_catalog_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("ranges.json"))
}

/// On-disk form of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub version: u32,
    pub next_id: RangeId,
    #[serde(default)]
    pub ranges: Vec<ScoreRange>,
}

impl CatalogSnapshot {
    pub fn capture(catalog: &RangeCatalog) -> Result<Self> {
        Ok(Self {
            version: CATALOG_VERSION,
            next_id: catalog.next_id()?,
            ranges: catalog.list_all()?,
        })
    }
}

/// Load the catalog from a JSON file
///
/// If the file doesn't exist, returns an empty catalog.
/// If the file has an unsupported version or inconsistent ranges, returns an error.
pub fn load_catalog(path: &Path) -> Result<RangeCatalog> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Catalog file missing, starting empty");
        return Ok(RangeCatalog::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open catalog file at {}", path.display()))?;

    let snapshot: CatalogSnapshot = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse catalog file at {}", path.display()))?;

    if snapshot.version != CATALOG_VERSION {
        anyhow::bail!("Unsupported catalog version: {}", snapshot.version);
    }

    let catalog = RangeCatalog::restore(snapshot.next_id, snapshot.ranges)
        .with_context(|| format!("Inconsistent catalog in {}", path.display()))?;

    tracing::debug!(path = %path.display(), ranges = catalog.len()?, "Loaded catalog");
    Ok(catalog)
}

/// Save the catalog to a JSON file atomically
///
/// The file is never left half-written. Parent directories are created as needed.
pub fn save_catalog(path: &Path, catalog: &RangeCatalog) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let snapshot = CatalogSnapshot::capture(catalog)?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, &snapshot).context("Failed to serialize catalog")?;

    file.commit().context("Failed to save catalog")?;

    tracing::debug!(path = %path.display(), ranges = snapshot.ranges.len(), "Saved catalog");
    Ok(())
}
