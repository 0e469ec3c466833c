use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderMap, Method},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use picvote_shared::identity::Identity;
use picvote_shared::photo::PhotoRecord;
use picvote_shared::types::PhotoId;
use picvote_shared::vote::VoteStatus;

use crate::auth;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::gallery::Gallery;
use crate::realtime;
use crate::session::SessionStore;

/// Slack for multipart framing on top of the image size ceiling.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub gallery: Arc<Gallery>,
    pub sessions: SessionStore,
    pub config: Arc<ServerConfig>,
    pub http: reqwest::Client,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let uploads = ServeDir::new(state.config.uploads_dir.clone());

    Router::new()
        .route("/health", get(health_check))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/auth/:provider", get(auth::login))
        .route("/auth/:provider/callback", get(auth::callback))
        .route("/photos", get(list_photos))
        .route("/photos/:id", delete(delete_photo))
        .route("/upload", post(upload_photo))
        .route("/votes", get(vote_summary))
        .route("/vote", post(toggle_vote))
        .route("/ws", get(ws_upgrade))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(
            state.config.max_upload_bytes + MULTIPART_OVERHEAD,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// The identity attached to this request, or `None` for anonymous callers.
async fn current_identity(state: &AppState, headers: &HeaderMap) -> Option<Identity> {
    state.sessions.identity_from_headers(headers).await
}

async fn list_photos(
    State(state): State<AppState>,
) -> Result<Json<Vec<PhotoRecord>>, ServerError> {
    Ok(Json(state.gallery.list_photos().await?))
}

async fn vote_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BTreeMap<PhotoId, VoteStatus>>, ServerError> {
    let identity = current_identity(&state, &headers).await;
    Ok(Json(state.gallery.vote_summary(identity.as_ref()).await?))
}

#[derive(Deserialize)]
struct VoteRequest {
    #[serde(default)]
    photo_id: String,
}

async fn toggle_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VoteRequest>,
) -> Result<Json<VoteStatus>, ServerError> {
    let identity = current_identity(&state, &headers).await;
    let status = state
        .gallery
        .toggle_vote(identity.as_ref(), &PhotoId::from(req.photo_id))
        .await?;
    Ok(Json(status))
}

async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    let identity = current_identity(&state, &headers)
        .await
        .ok_or(ServerError::Unauthenticated)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidArgument(format!("multipart error: {e}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::InvalidArgument(format!("failed to read upload: {e}")))?;

        let record = state.gallery.upload(Some(&identity), &data).await?;
        info!(photo = %record.id, "Upload accepted");

        // Plain HTML form posts land back on the gallery.
        return Ok(Redirect::to(&state.config.gallery_redirect).into_response());
    }

    Err(ServerError::InvalidArgument(
        "missing 'photo' field in multipart form".to_string(),
    ))
}

async fn delete_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let identity = current_identity(&state, &headers).await;
    state
        .gallery
        .delete_photo(identity.as_ref(), &PhotoId::from(id))
        .await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let events = state.gallery.events().subscribe();
    ws.on_upgrade(move |socket| realtime::client_loop(socket, events))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
