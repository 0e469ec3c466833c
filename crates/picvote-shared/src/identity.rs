//! Voter identities and the ownership rule.
//!
//! An [`Identity`] is whatever the OAuth collaborator resolved for the
//! current request: a stable `(provider, subject-id)` pair plus the display
//! name at login time. The derived `voter_id()` string is the sole key used
//! for vote attribution and ownership comparison.

use serde::{Deserialize, Serialize};

use crate::types::Provider;

/// An authenticated user as resolved by the OAuth collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub provider: Provider,
    /// Stable subject identifier issued by the provider.
    pub subject: String,
    /// Display name at login time.
    pub name: String,
}

impl Identity {
    pub fn new(provider: Provider, subject: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            provider,
            subject: subject.into(),
            name: name.into(),
        }
    }

    /// The `provider:subject` key used everywhere votes and ownership are
    /// compared.
    pub fn voter_id(&self) -> String {
        format!("{}:{}", self.provider.as_str(), self.subject)
    }
}

/// Identity snapshot stored on a photo record at upload time.
///
/// Records written before subject ids were captured carry only `name`; the
/// ownership check falls back to display-name equality for those.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Uploader {
    pub provider: Provider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl Uploader {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            provider: identity.provider,
            id: Some(identity.subject.clone()),
            name: identity.name.clone(),
        }
    }

    /// Whether `identity` owns the photo this snapshot was taken for.
    ///
    /// The provider must match. Records with a stored subject id compare
    /// ids; legacy records without one compare display names, which is
    /// weaker and kept for compatibility with old ledger files.
    pub fn owned_by(&self, identity: &Identity) -> bool {
        if self.provider != identity.provider {
            return false;
        }
        match &self.id {
            Some(id) => *id == identity.subject,
            None => self.name == identity.name,
        }
    }
}
