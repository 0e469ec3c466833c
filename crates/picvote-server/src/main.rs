//! # picvote-server
//!
//! HTTP server for the picvote community photo contest.
//!
//! This binary provides:
//! - **OAuth login** (Google / Facebook) with cookie-backed sessions
//! - **Photo uploads** (multipart, sniffed and size-capped) stored on disk
//! - **Toggleable votes** persisted in whole-file JSON ledgers
//! - **WebSocket fan-out** so every connected viewer sees ledger changes
//!   live, without polling

mod api;
mod auth;
mod config;
mod error;
mod gallery;
mod media_store;
mod realtime;
mod session;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use picvote_store::{PhotoLedgerStore, VoteLedgerStore};

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::gallery::Gallery;
use crate::media_store::MediaStore;
use crate::realtime::EventBus;
use crate::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,picvote_server=debug")),
        )
        .init();

    info!("Starting picvote server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    info!(
        google = config.google.is_some(),
        facebook = config.facebook.is_some(),
        "OAuth providers"
    );

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------
    let photos = PhotoLedgerStore::open(config.photos_path()).await?;
    let votes = VoteLedgerStore::open(config.votes_path()).await?;
    let media = MediaStore::new(config.uploads_dir.clone(), config.max_upload_bytes).await?;
    let gallery = Arc::new(Gallery::new(photos, votes, media, EventBus::new()));

    let sessions = SessionStore::new(config.session_ttl_secs);

    // -----------------------------------------------------------------------
    // 4. Spawn background tasks
    // -----------------------------------------------------------------------

    // Periodic session cleanup (every 10 minutes).
    let store = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(600));
        loop {
            interval.tick().await;
            store.purge_expired().await;
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the HTTP server (blocks until shutdown)
    // -----------------------------------------------------------------------
    let http_addr = config.http_addr;
    let state = AppState {
        gallery,
        sessions,
        config: Arc::new(config),
        http: reqwest::Client::new(),
    };

    tokio::select! {
        result = api::serve(state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
