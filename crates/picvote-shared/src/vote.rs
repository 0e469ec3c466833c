//! The vote ledger and its toggle semantics.
//!
//! Membership in a photo's voter set is the sole source of truth: the
//! public count is always the length of the set, and the per-user "voted"
//! flag is plain membership. There is no separate counter to diverge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::PhotoId;

/// Public tally for one photo, relative to a viewer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteStatus {
    pub votes: usize,
    pub voted: bool,
}

/// Voter set for a single photo.
///
/// Stored as a list to keep the ledger file human-readable, but treated as
/// a set: a voter id appears at most once (membership test before insert).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteEntry {
    pub voters: Vec<String>,
}

impl VoteEntry {
    pub fn count(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, voter_id: &str) -> bool {
        self.voters.iter().any(|v| v == voter_id)
    }
}

/// Mapping from photo id to its voter set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct VoteLedger(BTreeMap<PhotoId, VoteEntry>);

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, photo_id: &PhotoId) -> Option<&VoteEntry> {
        self.0.get(photo_id)
    }

    pub fn contains(&self, photo_id: &PhotoId) -> bool {
        self.0.contains_key(photo_id)
    }

    /// Ensure an (empty) entry exists for a photo; used at upload time so
    /// every photo id has a corresponding voter set from the start.
    pub fn ensure(&mut self, photo_id: &PhotoId) {
        self.0.entry(photo_id.clone()).or_default();
    }

    /// Flip `voter_id`'s membership in the photo's voter set.
    ///
    /// Absent means insert (vote cast); present means remove (vote
    /// retracted). The entry is created lazily if this is the first vote to
    /// touch the photo id. Returns the post-toggle status for the acting
    /// voter.
    pub fn toggle(&mut self, photo_id: &PhotoId, voter_id: &str) -> VoteStatus {
        let entry = self.0.entry(photo_id.clone()).or_default();
        match entry.voters.iter().position(|v| v == voter_id) {
            Some(index) => {
                entry.voters.remove(index);
            }
            None => entry.voters.push(voter_id.to_string()),
        }
        VoteStatus {
            votes: entry.count(),
            voted: entry.has_voted(voter_id),
        }
    }

    /// Drop a photo's entry entirely (the photo was deleted).
    pub fn remove(&mut self, photo_id: &PhotoId) -> Option<VoteEntry> {
        self.0.remove(photo_id)
    }

    /// View over the whole ledger for one viewer. Anonymous viewers get
    /// `voted: false` everywhere.
    pub fn summary(&self, viewer: Option<&str>) -> BTreeMap<PhotoId, VoteStatus> {
        self.0
            .iter()
            .map(|(id, entry)| {
                let voted = viewer.map(|v| entry.has_voted(v)).unwrap_or(false);
                (
                    id.clone(),
                    VoteStatus {
                        votes: entry.count(),
                        voted,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> PhotoId {
        PhotoId::from("photo-1-abcd")
    }

    #[test]
    fn toggle_casts_then_retracts() {
        let mut ledger = VoteLedger::new();

        let cast = ledger.toggle(&photo(), "google:alice");
        assert_eq!(cast, VoteStatus { votes: 1, voted: true });

        let retracted = ledger.toggle(&photo(), "google:alice");
        assert_eq!(retracted, VoteStatus { votes: 0, voted: false });
    }

    #[test]
    fn double_toggle_restores_original_state() {
        let mut ledger = VoteLedger::new();
        ledger.toggle(&photo(), "google:alice");

        let before = ledger.get(&photo()).unwrap().clone();
        ledger.toggle(&photo(), "facebook:bob");
        ledger.toggle(&photo(), "facebook:bob");
        assert_eq!(ledger.get(&photo()).unwrap(), &before);
    }

    #[test]
    fn count_always_equals_voter_set_size() {
        let mut ledger = VoteLedger::new();
        let voters = ["google:a", "google:b", "facebook:c"];

        for voter in voters {
            let status = ledger.toggle(&photo(), voter);
            assert_eq!(status.votes, ledger.get(&photo()).unwrap().count());
        }
        assert_eq!(ledger.get(&photo()).unwrap().count(), 3);

        let status = ledger.toggle(&photo(), "google:a");
        assert_eq!(status.votes, 2);
        assert_eq!(ledger.get(&photo()).unwrap().count(), 2);
    }

    #[test]
    fn no_duplicate_voters() {
        let mut ledger = VoteLedger::new();
        // Cast, retract, cast again: exactly one membership.
        ledger.toggle(&photo(), "google:alice");
        ledger.toggle(&photo(), "google:alice");
        ledger.toggle(&photo(), "google:alice");
        assert_eq!(ledger.get(&photo()).unwrap().voters, vec!["google:alice"]);
    }

    #[test]
    fn ensure_creates_empty_entry_once() {
        let mut ledger = VoteLedger::new();
        ledger.ensure(&photo());
        ledger.toggle(&photo(), "google:alice");
        ledger.ensure(&photo());
        assert_eq!(ledger.get(&photo()).unwrap().count(), 1);
    }

    #[test]
    fn anonymous_summary_is_all_false() {
        let mut ledger = VoteLedger::new();
        ledger.toggle(&photo(), "google:alice");
        ledger.toggle(&PhotoId::from("photo-2-ef"), "google:alice");

        let summary = ledger.summary(None);
        assert_eq!(summary.len(), 2);
        assert!(summary.values().all(|s| !s.voted));
        assert_eq!(summary.get(&photo()).unwrap().votes, 1);
    }

    #[test]
    fn summary_is_relative_to_viewer() {
        let mut ledger = VoteLedger::new();
        ledger.toggle(&photo(), "google:alice");

        let alice = ledger.summary(Some("google:alice"));
        assert!(alice.get(&photo()).unwrap().voted);

        let bob = ledger.summary(Some("facebook:bob"));
        assert!(!bob.get(&photo()).unwrap().voted);
    }

    #[test]
    fn remove_drops_the_entry() {
        let mut ledger = VoteLedger::new();
        ledger.toggle(&photo(), "google:alice");
        assert!(ledger.remove(&photo()).is_some());
        assert!(!ledger.contains(&photo()));
        assert!(ledger.summary(None).is_empty());
    }

    #[test]
    fn ledger_serializes_as_plain_map() {
        let mut ledger = VoteLedger::new();
        ledger.toggle(&photo(), "google:alice");

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "photo-1-abcd": { "voters": ["google:alice"] } })
        );
    }
}
