//! Tenant-scoped meeting listing.
//!
//! - `GET /meetings` — the tenant's meetings, most recent first.
//!
//! Reads go straight to Postgres; Redis is never consulted.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use sr_store::Meeting;

use crate::api::auth::AuthedTenant;
use crate::api::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MeetingListResponse {
    pub meetings: Vec<Meeting>,
}

pub async fn list_meetings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedTenant>,
) -> Result<Json<MeetingListResponse>, ApiError> {
    let meetings = state.meetings.list_for_tenant(auth.tenant.id).await?;
    Ok(Json(MeetingListResponse { meetings }))
}
