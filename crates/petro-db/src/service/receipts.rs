//! # Receipt Storage
//!
//! Deposit slips are stored before the deposit is recorded; the custody
//! workflow only keeps the returned location. A deposit that is then refused
//! discards the stored copy.
//!
//! Both operations block on the filesystem; async callers run them on the
//! blocking pool.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use super::error::ServiceResult;

/// Where receipt files go.
pub trait ReceiptStore: Send + Sync {
    /// Stores the file at `source` and returns a location string for it.
    fn store(&self, source: &Path) -> ServiceResult<String>;

    /// Removes a file previously returned by [`ReceiptStore::store`].
    fn discard(&self, location: &str) -> ServiceResult<()>;
}

/// Copies receipts into a local directory under a unique name.
#[derive(Debug, Clone)]
pub struct FsReceiptStore {
    root: PathBuf,
}

impl FsReceiptStore {
    /// Uses `root`, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> ServiceResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(FsReceiptStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ReceiptStore for FsReceiptStore {
    fn store(&self, source: &Path) -> ServiceResult<String> {
        let mut name = format!("receipt-{}", Uuid::new_v4());
        if let Some(ext) = source.extension().and_then(|e| e.to_str()) {
            name.push('.');
            name.push_str(&ext.to_ascii_lowercase());
        }

        let target = self.root.join(name);
        fs::copy(source, &target)?;

        debug!(source = %source.display(), target = %target.display(), "Receipt stored");
        Ok(target.to_string_lossy().into_owned())
    }

    fn discard(&self, location: &str) -> ServiceResult<()> {
        let path = Path::new(location);
        if path.parent() != Some(self.root.as_path()) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{location} is not in the receipt directory"),
            )
            .into());
        }

        fs::remove_file(path)?;
        debug!(location = %location, "Receipt discarded");
        Ok(())
    }
}
