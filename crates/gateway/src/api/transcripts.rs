//! Tenant-scoped transcript retrieval.
//!
//! - `GET /transcripts/:platform/:native_id` — the most recent meeting for
//!   the triple plus its segments in ascending start-time order.
//!
//! A tenant may have several meeting rows for the same native id across
//! relaunches; reads always pick the newest one.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;

use sr_domain::{Error, MeetingKey, Platform};
use sr_store::{Meeting, TranscriptSegment};

use crate::api::auth::AuthedTenant;
use crate::api::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub meeting: Meeting,
    pub segments: Vec<TranscriptSegment>,
}

pub async fn get_transcript(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedTenant>,
    Path((platform, native_id)): Path<(String, String)>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let platform: Platform = platform.parse()?;
    let key = MeetingKey::new(platform, native_id, auth.token.clone())?;

    let meeting = state
        .meetings
        .latest_for(auth.tenant.id, &key)
        .await?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "no meeting found for {}/{}",
                key.platform, key.native_id
            ))
        })?;

    let segments = state.segments.for_meeting(meeting.id).await?;
    Ok(Json(TranscriptResponse { meeting, segments }))
}
