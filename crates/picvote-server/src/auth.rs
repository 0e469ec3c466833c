//! OAuth login flow and identity endpoints.
//!
//! The identity exchange itself belongs to the provider: this module only
//! builds the consent redirect, validates the CSRF `state` token, trades
//! the authorization code for an access token, and reads the minimal
//! profile (stable subject id plus display name). Whatever comes back is
//! snapshotted into an [`Identity`] and attached to a cookie session.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use picvote_shared::identity::Identity;
use picvote_shared::types::Provider;

use crate::api::AppState;
use crate::config::{OAuthCredentials, ServerConfig};
use crate::error::ServerError;
use crate::session;

struct ProviderEndpoints {
    authorize_url: &'static str,
    token_url: &'static str,
    profile_url: &'static str,
    scope: &'static str,
}

fn endpoints(provider: Provider) -> ProviderEndpoints {
    match provider {
        Provider::Google => ProviderEndpoints {
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth",
            token_url: "https://oauth2.googleapis.com/token",
            profile_url: "https://www.googleapis.com/oauth2/v2/userinfo",
            scope: "profile",
        },
        Provider::Facebook => ProviderEndpoints {
            authorize_url: "https://www.facebook.com/v12.0/dialog/oauth",
            token_url: "https://graph.facebook.com/v12.0/oauth/access_token",
            profile_url: "https://graph.facebook.com/me?fields=id,name",
            scope: "public_profile",
        },
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Minimal profile shape shared by both providers.
#[derive(Deserialize)]
struct Profile {
    id: String,
    name: String,
}

/// Resolve a route's provider segment to a configured provider.
fn configured_provider(
    config: &ServerConfig,
    name: &str,
) -> Result<(Provider, OAuthCredentials), ServerError> {
    let provider = Provider::parse(name)
        .ok_or_else(|| ServerError::NotFound(format!("unknown auth provider '{name}'")))?;
    let credentials = config
        .oauth_credentials(provider)
        .ok_or_else(|| ServerError::NotFound(format!("auth provider '{name}' is not configured")))?;
    Ok((provider, credentials))
}

fn callback_url(config: &ServerConfig, provider: Provider) -> String {
    format!(
        "{}/auth/{}/callback",
        config.public_base_url.trim_end_matches('/'),
        provider
    )
}

/// `GET /auth/:provider` — send the browser to the provider's consent page.
pub async fn login(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ServerError> {
    let (provider, credentials) = configured_provider(&state.config, &name)?;
    let endpoints = endpoints(provider);

    let login_state = state.sessions.issue_login_state().await;
    let url = reqwest::Url::parse_with_params(
        endpoints.authorize_url,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("redirect_uri", callback_url(&state.config, provider).as_str()),
            ("response_type", "code"),
            ("scope", endpoints.scope),
            ("state", login_state.to_string().as_str()),
        ],
    )
    .map_err(|e| ServerError::Internal(format!("bad authorize URL: {e}")))?;

    Ok(Redirect::to(url.as_str()).into_response())
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// `GET /auth/:provider/callback` — finish the exchange and open a session.
pub async fn callback(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ServerError> {
    let (provider, credentials) = configured_provider(&state.config, &name)?;

    // The user backed out on the consent page; just return home.
    if let Some(error) = query.error {
        warn!(provider = %provider, error = %error, "Provider rejected login");
        return Ok(Redirect::to("/").into_response());
    }

    let csrf = query
        .state
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ServerError::InvalidArgument("missing login state".to_string()))?;
    if !state.sessions.take_login_state(csrf).await {
        return Err(ServerError::InvalidArgument(
            "unknown or expired login state".to_string(),
        ));
    }

    let code = query
        .code
        .ok_or_else(|| ServerError::InvalidArgument("missing authorization code".to_string()))?;

    let identity = exchange_code(&state, provider, &credentials, &code).await?;
    info!(voter = %identity.voter_id(), "Login complete");

    let session_id = state.sessions.create(identity).await;
    let mut response = Redirect::to(&state.config.gallery_redirect).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        session::session_cookie_value(session_id)
            .parse()
            .map_err(|_| ServerError::Internal("invalid session cookie".to_string()))?,
    );
    Ok(response)
}

/// Trade the authorization code for an access token, then fetch the
/// profile. Network or shape failures surface as 502s.
async fn exchange_code(
    state: &AppState,
    provider: Provider,
    credentials: &OAuthCredentials,
    code: &str,
) -> Result<Identity, ServerError> {
    let endpoints = endpoints(provider);
    let redirect_uri = callback_url(&state.config, provider);

    let token: TokenResponse = state
        .http
        .post(endpoints.token_url)
        .form(&[
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| ServerError::AuthExchange(format!("token request failed: {e}")))?
        .error_for_status()
        .map_err(|e| ServerError::AuthExchange(format!("token endpoint refused: {e}")))?
        .json()
        .await
        .map_err(|e| ServerError::AuthExchange(format!("malformed token response: {e}")))?;

    let profile: Profile = state
        .http
        .get(endpoints.profile_url)
        .bearer_auth(&token.access_token)
        .send()
        .await
        .map_err(|e| ServerError::AuthExchange(format!("profile request failed: {e}")))?
        .error_for_status()
        .map_err(|e| ServerError::AuthExchange(format!("profile endpoint refused: {e}")))?
        .json()
        .await
        .map_err(|e| ServerError::AuthExchange(format!("malformed profile response: {e}")))?;

    Ok(Identity::new(provider, profile.id, profile.name))
}

/// `GET /me` — identity probe for the front-end.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.sessions.identity_from_headers(&headers).await {
        Some(identity) => Json(serde_json::json!({
            "ok": true,
            "user": { "provider": identity.provider, "name": identity.name },
        }))
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "ok": false })),
        )
            .into_response(),
    }
}

/// `POST /logout` — drop the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session::session_cookie(&headers) {
        state.sessions.remove(id).await;
    }

    let mut response = Json(serde_json::json!({ "ok": true })).into_response();
    if let Ok(value) = session::clear_session_cookie().parse() {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}
