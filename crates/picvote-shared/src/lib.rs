//! # picvote-shared
//!
//! Domain types and pure ledger logic for the picvote service: photo
//! records, voter identities, the vote ledger with its toggle semantics,
//! and the real-time event vocabulary. No I/O lives here; persistence and
//! transport belong to `picvote-store` and `picvote-server`.

pub mod events;
pub mod identity;
pub mod photo;
pub mod types;
pub mod vote;

pub use events::RealtimeEvent;
pub use identity::{Identity, Uploader};
pub use photo::PhotoRecord;
pub use types::{PhotoId, Provider};
pub use vote::{VoteEntry, VoteLedger, VoteStatus};
