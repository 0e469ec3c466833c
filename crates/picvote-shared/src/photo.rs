use serde::{Deserialize, Serialize};

use crate::identity::{Identity, Uploader};
use crate::types::PhotoId;

/// A single uploaded photo. Append-only: never mutated after creation,
/// removed from the ledger only by an owner-authorized delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhotoRecord {
    pub id: PhotoId,
    /// Public path of the stored image, e.g. `/uploads/1712345-9f3a.jpg`.
    pub src: String,
    /// Identity snapshot taken at upload time. Records from before uploads
    /// were attributed may lack it entirely; such photos have no owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<Uploader>,
}

impl PhotoRecord {
    pub fn new(id: PhotoId, src: impl Into<String>, uploader: &Identity) -> Self {
        Self {
            id,
            src: src.into(),
            uploader: Some(Uploader::from_identity(uploader)),
        }
    }

    /// Whether `identity` may delete this photo. A record with no recorded
    /// uploader has no owner and cannot be deleted by anyone.
    pub fn owned_by(&self, identity: &Identity) -> bool {
        self.uploader
            .as_ref()
            .map(|u| u.owned_by(identity))
            .unwrap_or(false)
    }
}
