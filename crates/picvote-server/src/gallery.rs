//! The photo and vote ledgers and the operations that mutate them.
//!
//! Every operation re-reads the full ledger from disk, applies the mutation
//! in memory, writes the ledger back wholesale, and only then broadcasts
//! the delta, so a client refreshing after a broadcast always observes a
//! ledger consistent with it.
//!
//! There is no locking: two concurrent mutations can each load a stale
//! snapshot, and the second write overwrites the first (last-writer-wins on
//! the whole file). That is the documented consistency model for this
//! low-volume, single-host deployment.

use std::collections::BTreeMap;

use tracing::{debug, info};

use picvote_shared::events::RealtimeEvent;
use picvote_shared::identity::Identity;
use picvote_shared::photo::PhotoRecord;
use picvote_shared::types::PhotoId;
use picvote_shared::vote::VoteStatus;
use picvote_store::{PhotoLedgerStore, VoteLedgerStore};

use crate::error::ServerError;
use crate::media_store::MediaStore;
use crate::realtime::EventBus;

/// Ledger operations behind the HTTP surface.
pub struct Gallery {
    photos: PhotoLedgerStore,
    votes: VoteLedgerStore,
    media: MediaStore,
    events: EventBus,
}

impl Gallery {
    pub fn new(
        photos: PhotoLedgerStore,
        votes: VoteLedgerStore,
        media: MediaStore,
        events: EventBus,
    ) -> Self {
        Self {
            photos,
            votes,
            media,
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// All photos, insertion order, oldest first.
    pub async fn list_photos(&self) -> Result<Vec<PhotoRecord>, ServerError> {
        Ok(self.photos.load().await?)
    }

    /// Tally for every photo, with `voted` relative to the viewer.
    /// Anonymous viewers get `voted: false` everywhere.
    pub async fn vote_summary(
        &self,
        viewer: Option<&Identity>,
    ) -> Result<BTreeMap<PhotoId, VoteStatus>, ServerError> {
        let ledger = self.votes.load().await?;
        let voter_id = viewer.map(|v| v.voter_id());
        Ok(ledger.summary(voter_id.as_deref()))
    }

    /// Flip the identity's vote on a photo and return the new tally.
    pub async fn toggle_vote(
        &self,
        identity: Option<&Identity>,
        photo_id: &PhotoId,
    ) -> Result<VoteStatus, ServerError> {
        let identity = identity.ok_or(ServerError::Unauthenticated)?;
        if photo_id.is_empty() {
            return Err(ServerError::InvalidArgument("photo_id is required".to_string()));
        }

        let mut ledger = self.votes.load().await?;
        let status = ledger.toggle(photo_id, &identity.voter_id());

        // The write must land before anyone hears about it.
        self.votes.save(&ledger).await?;

        debug!(photo = %photo_id, votes = status.votes, voted = status.voted, "Vote toggled");
        self.events.emit(RealtimeEvent::VoteUpdated {
            photo_id: photo_id.clone(),
            data: status,
        });
        Ok(status)
    }

    /// Store the image, append the record, seed its (empty) vote entry.
    pub async fn upload(
        &self,
        identity: Option<&Identity>,
        data: &[u8],
    ) -> Result<PhotoRecord, ServerError> {
        let identity = identity.ok_or(ServerError::Unauthenticated)?;

        let src = self.media.store_image(data).await?;
        let record = PhotoRecord::new(PhotoId::generate(), src, identity);

        self.photos.append(record.clone()).await?;

        let mut votes = self.votes.load().await?;
        votes.ensure(&record.id);
        self.votes.save(&votes).await?;

        info!(photo = %record.id, uploader = %identity.voter_id(), "Photo uploaded");
        self.events.emit(RealtimeEvent::PhotoAdded {
            id: record.id.clone(),
            src: record.src.clone(),
            votes: 0,
            voted: false,
        });
        Ok(record)
    }

    /// Remove a photo and its voter set. Owner only.
    ///
    /// The stored image file is left on disk; orphaned files are accepted
    /// behavior, not a correctness bug.
    pub async fn delete_photo(
        &self,
        identity: Option<&Identity>,
        photo_id: &PhotoId,
    ) -> Result<(), ServerError> {
        let identity = identity.ok_or(ServerError::Unauthenticated)?;

        let mut photos = self.photos.load().await?;
        let index = photos
            .iter()
            .position(|p| p.id == *photo_id)
            .ok_or_else(|| ServerError::NotFound(format!("no photo '{photo_id}'")))?;

        if !photos[index].owned_by(identity) {
            return Err(ServerError::Forbidden(
                "only the uploader may delete a photo".to_string(),
            ));
        }

        let removed = photos.remove(index);
        self.photos.save(&photos).await?;

        let mut votes = self.votes.load().await?;
        votes.remove(&removed.id);
        self.votes.save(&votes).await?;

        info!(photo = %removed.id, "Photo deleted");
        self.events.emit(RealtimeEvent::PhotoDeleted { id: removed.id });
        Ok(())
    }
}
