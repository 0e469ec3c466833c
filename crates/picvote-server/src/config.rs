//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. OAuth providers stay disabled until
//! their credentials are supplied.

use std::net::SocketAddr;
use std::path::PathBuf;

use picvote_shared::types::Provider;

/// Client credentials for one OAuth provider.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:3000`
    pub http_addr: SocketAddr,

    /// Directory holding the ledger files (`photos.json`, `votes.json`).
    /// Env: `DATA_DIR`
    /// Default: `./data`
    pub data_dir: PathBuf,

    /// Directory where uploaded images are stored and served from.
    /// Env: `UPLOADS_DIR`
    /// Default: `./uploads`
    pub uploads_dir: PathBuf,

    /// Externally reachable base URL, used to build OAuth callback URLs.
    /// Env: `PUBLIC_BASE_URL`
    /// Default: `http://localhost:3000`
    pub public_base_url: String,

    /// Upload size ceiling in bytes.
    /// Env: `MAX_UPLOAD_BYTES`
    /// Default: 10 MiB
    pub max_upload_bytes: usize,

    /// Where the browser is sent after a login or upload completes.
    /// Env: `GALLERY_REDIRECT`
    /// Default: `/#photos`
    pub gallery_redirect: String,

    /// Session lifetime in seconds.
    /// Env: `SESSION_TTL_SECS`
    /// Default: 7 days
    pub session_ttl_secs: u64,

    /// Google OAuth credentials.
    /// Env: `GOOGLE_CLIENT_ID` + `GOOGLE_CLIENT_SECRET`
    pub google: Option<OAuthCredentials>,

    /// Facebook OAuth credentials.
    /// Env: `FACEBOOK_APP_ID` + `FACEBOOK_APP_SECRET`
    pub facebook: Option<OAuthCredentials>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 3000).into(),
            data_dir: PathBuf::from("./data"),
            uploads_dir: PathBuf::from("./uploads"),
            public_base_url: "http://localhost:3000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024, // 10 MiB
            gallery_redirect: "/#photos".to_string(),
            session_ttl_secs: 7 * 24 * 60 * 60,
            google: None,
            facebook: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(dir) = std::env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("UPLOADS_DIR") {
            config.uploads_dir = PathBuf::from(dir);
        }

        if let Ok(url) = std::env::var("PUBLIC_BASE_URL") {
            config.public_base_url = url;
        }

        if let Ok(val) = std::env::var("MAX_UPLOAD_BYTES") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_upload_bytes = n;
            } else {
                tracing::warn!(value = %val, "Invalid MAX_UPLOAD_BYTES, using default");
            }
        }

        if let Ok(anchor) = std::env::var("GALLERY_REDIRECT") {
            config.gallery_redirect = anchor;
        }

        if let Ok(val) = std::env::var("SESSION_TTL_SECS") {
            if let Ok(n) = val.parse::<u64>() {
                config.session_ttl_secs = n;
            } else {
                tracing::warn!(value = %val, "Invalid SESSION_TTL_SECS, using default");
            }
        }

        config.google = provider_credentials("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET");
        config.facebook = provider_credentials("FACEBOOK_APP_ID", "FACEBOOK_APP_SECRET");

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// Path of the photo ledger file.
    pub fn photos_path(&self) -> PathBuf {
        self.data_dir.join("photos.json")
    }

    /// Path of the vote ledger file.
    pub fn votes_path(&self) -> PathBuf {
        self.data_dir.join("votes.json")
    }

    /// Credentials for a provider, if it is configured.
    pub fn oauth_credentials(&self, provider: Provider) -> Option<OAuthCredentials> {
        match provider {
            Provider::Google => self.google.clone(),
            Provider::Facebook => self.facebook.clone(),
        }
    }
}

/// Read one provider's credential pair. Both variables must be present and
/// non-empty; a partial pair disables the provider with a warning.
fn provider_credentials(id_var: &str, secret_var: &str) -> Option<OAuthCredentials> {
    let client_id = std::env::var(id_var).ok().filter(|v| !v.is_empty());
    let client_secret = std::env::var(secret_var).ok().filter(|v| !v.is_empty());

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Some(OAuthCredentials {
            client_id,
            client_secret,
        }),
        (Some(_), None) | (None, Some(_)) => {
            tracing::warn!(
                id_var,
                secret_var,
                "Partial OAuth credentials, provider disabled"
            );
            None
        }
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 3000).into());
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.google.is_none());
        assert!(config.facebook.is_none());
    }

    #[test]
    fn test_ledger_paths_live_under_data_dir() {
        let config = ServerConfig::default();
        assert_eq!(config.photos_path(), PathBuf::from("./data/photos.json"));
        assert_eq!(config.votes_path(), PathBuf::from("./data/votes.json"));
    }

    #[test]
    fn test_unconfigured_provider_has_no_credentials() {
        let config = ServerConfig::default();
        assert!(config.oauth_credentials(Provider::Google).is_none());
        assert!(config.oauth_credentials(Provider::Facebook).is_none());
    }
}
