//! The vote ledger store: `votes.json`, photo id to voter list.

use std::path::{Path, PathBuf};

use picvote_shared::vote::VoteLedger;

use crate::error::Result;
use crate::ledger::JsonLedger;

/// Store handle for `votes.json`.
pub struct VoteLedgerStore {
    ledger: JsonLedger<VoteLedger>,
}

impl VoteLedgerStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            ledger: JsonLedger::open(path).await?,
        })
    }

    pub fn path(&self) -> &Path {
        self.ledger.path()
    }

    /// Read the full vote ledger; missing file means no votes yet.
    pub async fn load(&self) -> Result<VoteLedger> {
        self.ledger.load().await
    }

    /// Rewrite the whole ledger.
    pub async fn save(&self, ledger: &VoteLedger) -> Result<()> {
        self.ledger.save(ledger).await
    }
}
