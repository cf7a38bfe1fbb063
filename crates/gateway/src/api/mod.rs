pub mod auth;
pub mod bots;
pub mod health;
pub mod meetings;
pub mod transcripts;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use sr_domain::Error;

use crate::ingest;
use crate::state::AppState;

/// Build the full API router.
///
/// Routes split into **public** (health probe, the worker collector socket)
/// and **protected** (everything tenant-facing, gated behind the
/// `X-API-Key` middleware). `state` is needed to wire the auth middleware
/// at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/healthz", get(health::healthz))
        // Transcription workers hold long-lived duplex connections here;
        // they authenticate at the network layer, not per-tenant.
        .route("/collector", get(ingest::ws::collector_ws));

    let protected = Router::new()
        .route("/bots", post(bots::request_bot))
        .route("/bots/:platform/:native_id", delete(bots::stop_bot))
        .route("/meetings", get(meetings::list_meetings))
        .route(
            "/transcripts/:platform/:native_id",
            get(transcripts::get_transcript),
        )
        .layer(middleware::from_fn_with_state(
            state,
            auth::require_api_key,
        ));

    public.merge(protected)
}

/// Response-side wrapper for the shared error type. One place maps every
/// error kind onto its status code and JSON body.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            Error::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": self.0.to_string() }),
            ),
            Error::InvalidCredential => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": self.0.to_string() }),
            ),
            Error::Validation(_) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.0.to_string() }),
            ),
            Error::Conflict { meeting_key } => (
                StatusCode::CONFLICT,
                serde_json::json!({
                    "status": "conflict",
                    "meeting_id": meeting_key,
                    "message": self.0.to_string(),
                }),
            ),
            Error::NotFound(_) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": self.0.to_string() }),
            ),
            Error::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({ "error": self.0.to_string() }),
            ),
            Error::LaunchFailed(_) | Error::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": self.0.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_kind_keeps_its_status_code() {
        let cases = [
            (Error::MissingCredential, StatusCode::UNAUTHORIZED),
            (Error::InvalidCredential, StatusCode::FORBIDDEN),
            (Error::Validation("bad url".into()), StatusCode::BAD_REQUEST),
            (
                Error::Conflict {
                    meeting_key: "google_meet:abc-defg-hij:K".into(),
                },
                StatusCode::CONFLICT,
            ),
            (Error::NotFound("no meeting".into()), StatusCode::NOT_FOUND),
            (
                Error::Unavailable("redis down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                Error::LaunchFailed("image missing".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError(error).into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn conflict_body_echoes_the_triple() {
        let response = ApiError(Error::Conflict {
            meeting_key: "google_meet:abc-defg-hij:K".into(),
        })
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "conflict");
        assert_eq!(body["meeting_id"], "google_meet:abc-defg-hij:K");
    }
}
