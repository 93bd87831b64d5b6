//! Stocking the market from a JSON seed file.
//!
//! The file holds an array of `{name, price, barcode, description}` objects.
//! Seeding is idempotent: items whose name or barcode is already present are
//! skipped, so the same file can be applied on every startup.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::NewItem;
use crate::domain::ports::{ItemPersistenceError, ItemRepository, StockOutcome};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file at {path} is not a valid item list: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to stock item: {0}")]
    Persistence(#[from] ItemPersistenceError),
}

/// Counts reported after a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Read `path` and stock every item it lists that is not already present.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use market::outbound::memory::InMemoryMarketStore;
/// use market::seeding::seed_items_from_file;
///
/// # async fn run() -> Result<(), market::seeding::SeedError> {
/// let store = InMemoryMarketStore::new();
/// let report = seed_items_from_file(Path::new("fixtures/items.json"), &store).await?;
/// println!("{} new items", report.inserted);
/// # Ok(())
/// # }
/// ```
pub async fn seed_items_from_file(
    path: &Path,
    items: &dyn ItemRepository,
) -> Result<SeedReport, SeedError> {
    let stock = load_seed_file(path)?;
    let report = seed_items(&stock, items).await?;
    info!(
        path = %path.display(),
        inserted = report.inserted,
        skipped = report.skipped,
        "item seeding complete"
    );
    Ok(report)
}

/// Stock each item in order, counting the ones that already existed.
pub async fn seed_items(
    stock: &[NewItem],
    items: &dyn ItemRepository,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    for item in stock {
        match items.insert_if_absent(item).await? {
            StockOutcome::Inserted => report.inserted += 1,
            StockOutcome::AlreadyPresent => {
                debug!(name = %item.name, "item already stocked; skipping");
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}

fn load_seed_file(path: &Path) -> Result<Vec<NewItem>, SeedError> {
    let read_error = |source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "seed path must name a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let payload = dir.read(Path::new(file_name)).map_err(read_error)?;
    serde_json::from_slice(&payload).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
