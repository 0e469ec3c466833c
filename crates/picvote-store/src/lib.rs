//! # picvote-store
//!
//! Durable persistence for the picvote ledgers.
//!
//! Both ledgers are whole-file JSON documents: re-read in full on every
//! operation, rewritten wholesale on every mutation, and kept
//! human-inspectable on disk. There is no caching layer, so read-after-write
//! is always consistent with the latest committed write; under concurrent
//! writers the model is last-writer-wins.

pub mod ledger;
pub mod photos;
pub mod votes;

mod error;

pub use error::{Result, StoreError};
pub use photos::PhotoLedgerStore;
pub use votes::VoteLedgerStore;
