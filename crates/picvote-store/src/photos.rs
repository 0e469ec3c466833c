//! The photo ledger: an ordered, append-only sequence of [`PhotoRecord`]s.

use std::path::{Path, PathBuf};

use picvote_shared::photo::PhotoRecord;

use crate::error::Result;
use crate::ledger::JsonLedger;

/// Store handle for `photos.json`.
pub struct PhotoLedgerStore {
    ledger: JsonLedger<Vec<PhotoRecord>>,
}

impl PhotoLedgerStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            ledger: JsonLedger::open(path).await?,
        })
    }

    pub fn path(&self) -> &Path {
        self.ledger.path()
    }

    /// All photos in insertion order, oldest first.
    pub async fn load(&self) -> Result<Vec<PhotoRecord>> {
        self.ledger.load().await
    }

    /// Rewrite the whole ledger.
    pub async fn save(&self, photos: &[PhotoRecord]) -> Result<()> {
        self.ledger.save(photos).await
    }

    /// Append one record and persist.
    pub async fn append(&self, record: PhotoRecord) -> Result<()> {
        let mut photos = self.load().await?;
        photos.push(record);
        self.save(&photos).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picvote_shared::identity::Identity;
    use picvote_shared::types::{PhotoId, Provider};
    use tempfile::TempDir;

    fn record(id: &str) -> PhotoRecord {
        let uploader = Identity::new(Provider::Google, "g-1", "Alice");
        PhotoRecord::new(PhotoId::from(id), format!("/uploads/{id}.jpg"), &uploader)
    }

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = PhotoLedgerStore::open(dir.path().join("photos.json"))
            .await
            .unwrap();

        store.append(record("photo-1-a")).await.unwrap();
        store.append(record("photo-2-b")).await.unwrap();
        store.append(record("photo-3-c")).await.unwrap();

        let ids: Vec<_> = store
            .load()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.as_str().to_string())
            .collect();
        assert_eq!(ids, ["photo-1-a", "photo-2-b", "photo-3-c"]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = PhotoLedgerStore::open(dir.path().join("photos.json"))
            .await
            .unwrap();
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn legacy_file_without_uploader_ids_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photos.json");
        tokio::fs::write(
            &path,
            r#"[{"id":"photo-1-a","src":"/uploads/a.jpg","uploader":{"provider":"google","name":"Alice"}}]"#,
        )
        .await
        .unwrap();

        let store = PhotoLedgerStore::open(&path).await.unwrap();
        let photos = store.load().await.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].uploader.as_ref().unwrap().id, None);
    }
}
