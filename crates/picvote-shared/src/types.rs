use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported OAuth identity providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Parse a provider name as it appears in route paths.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "google" => Some(Self::Google),
            "facebook" => Some(Self::Facebook),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque unique photo identifier, generated at upload time and stable for
/// the record's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(pub String);

impl PhotoId {
    /// Generate a fresh id: upload-time millis plus a random suffix.
    ///
    /// The suffix keeps ids from colliding when two uploads land in the
    /// same millisecond.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::random();
        Self(format!("photo-{millis}-{suffix:08x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for PhotoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PhotoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trip() {
        assert_eq!(Provider::parse("google"), Some(Provider::Google));
        assert_eq!(Provider::parse("facebook"), Some(Provider::Facebook));
        assert_eq!(Provider::parse("github"), None);
        assert_eq!(Provider::Google.to_string(), "google");
    }

    #[test]
    fn provider_serializes_lowercase() {
        let json = serde_json::to_string(&Provider::Facebook).unwrap();
        assert_eq!(json, "\"facebook\"");
    }

    #[test]
    fn photo_id_has_prefix_and_is_unique() {
        let a = PhotoId::generate();
        let b = PhotoId::generate();
        assert!(a.as_str().starts_with("photo-"));
        assert_ne!(a, b);
    }

    #[test]
    fn photo_id_serializes_as_plain_string() {
        let id = PhotoId::from("photo-1-abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"photo-1-abc\"");
    }
}
