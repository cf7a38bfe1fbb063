//! API authentication middleware.
//!
//! Every tenant-facing request carries an opaque API key in the `X-API-Key`
//! header. The key resolves to its tenant through one indexed lookup; the
//! resolved principal (plus the raw key, which scopes the meeting triple)
//! is attached to the request for handlers to extract.
//!
//! Exactly one header name is accepted per deployment — `X-API-Token` and
//! friends are rejected like any missing credential.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use sr_domain::Error;
use sr_store::Tenant;

use crate::api::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The authenticated principal, inserted as a request extension.
#[derive(Clone)]
pub struct AuthedTenant {
    pub tenant: Tenant,
    /// The raw key as presented. Part of the canonical meeting triple, so
    /// two tenants on the same meeting never collide.
    pub token: String,
}

/// Axum middleware enforcing API-key authentication on protected routes.
/// Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned);

    let token = match token {
        Some(t) => t,
        None => {
            tracing::warn!(path = %req.uri().path(), "request rejected: missing API key");
            return ApiError(Error::MissingCredential).into_response();
        }
    };

    match state.tenants.resolve_token(&token).await {
        Ok(Some(tenant)) => {
            tracing::debug!(tenant_id = tenant.id, "API key resolved");
            req.extensions_mut().insert(AuthedTenant { tenant, token });
            next.run(req).await
        }
        Ok(None) => {
            tracing::warn!(path = %req.uri().path(), "request rejected: unknown API key");
            ApiError(Error::InvalidCredential).into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}
