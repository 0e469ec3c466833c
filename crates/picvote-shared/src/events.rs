use serde::{Deserialize, Serialize};

use crate::types::PhotoId;
use crate::vote::VoteStatus;

/// Ledger deltas pushed to every connected viewer.
///
/// These are server-to-client only; a viewer connecting mid-stream receives
/// no backlog and is expected to fetch the read views first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RealtimeEvent {
    /// A vote was cast or retracted. `data.voted` reflects the acting
    /// user, not the receiving viewer.
    #[serde(rename = "voteUpdated")]
    VoteUpdated { photo_id: PhotoId, data: VoteStatus },

    /// A new photo entered the ledger.
    #[serde(rename = "photoAdded")]
    PhotoAdded {
        id: PhotoId,
        src: String,
        votes: usize,
        voted: bool,
    },

    /// A photo (and its voter set) was removed.
    #[serde(rename = "photoDeleted")]
    PhotoDeleted { id: PhotoId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_updated_wire_shape() {
        let event = RealtimeEvent::VoteUpdated {
            photo_id: PhotoId::from("photo-1-a"),
            data: VoteStatus { votes: 3, voted: true },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({
                "type": "voteUpdated",
                "photo_id": "photo-1-a",
                "data": { "votes": 3, "voted": true },
            })
        );
    }

    #[test]
    fn photo_added_wire_shape() {
        let event = RealtimeEvent::PhotoAdded {
            id: PhotoId::from("photo-1-a"),
            src: "/uploads/1-a.jpg".to_string(),
            votes: 0,
            voted: false,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({
                "type": "photoAdded",
                "id": "photo-1-a",
                "src": "/uploads/1-a.jpg",
                "votes": 0,
                "voted": false,
            })
        );
    }

    #[test]
    fn photo_deleted_wire_shape() {
        let event = RealtimeEvent::PhotoDeleted {
            id: PhotoId::from("photo-1-a"),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({ "type": "photoDeleted", "id": "photo-1-a" })
        );
    }
}
