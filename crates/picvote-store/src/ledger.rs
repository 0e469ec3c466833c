//! Whole-file JSON persistence.
//!
//! [`JsonLedger`] owns a path and reads or writes the entire document on
//! every call. `load` always reflects the latest committed write; `save`
//! replaces the file contents wholesale. The write is a plain file replace,
//! not an atomic rename.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::debug;

use crate::error::Result;

/// Handle to one JSON ledger file.
pub struct JsonLedger<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonLedger<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Create a ledger handle. The parent directory is created if missing;
    /// the file itself appears on first save.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            path,
            _marker: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full ledger. A missing file loads as the default (empty)
    /// document, so a fresh deployment needs no seed files.
    pub async fn load(&self) -> Result<T> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replace the file with a pretty-printed rendering of `value`, keeping
    /// the ledger inspectable with any text editor.
    pub async fn save<S>(&self, value: &S) -> Result<()>
    where
        S: Serialize + ?Sized,
    {
        let json = serde_json::to_vec_pretty(value)?;
        fs::write(&self.path, &json).await?;
        debug!(path = %self.path.display(), bytes = json.len(), "ledger written");
        Ok(())
    }
}
