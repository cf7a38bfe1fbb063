//! Bot orchestration endpoints.
//!
//! - `POST   /bots`                        — launch a bot into a meeting
//! - `DELETE /bots/:platform/:native_id`   — stop the bot for a meeting
//!
//! The flow holds the cluster-wide invariant that at most one bot is live
//! or starting per (platform, native id, API key) triple: the Redis lock is
//! taken before anything else has side effects, and every failure path
//! releases it.

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sr_containers::LaunchSpec;
use sr_domain::{Error, MeetingKey, Platform};
use sr_protocol::{AutomaticLeave, BotConfig};
use sr_store::MeetingStatus;

use crate::api::auth::AuthedTenant;
use crate::api::ApiError;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct BotRequest {
    /// Platform tag, validated in the handler so an unknown value is a
    /// 400 and not an extractor rejection.
    pub platform: String,
    pub meeting_url: String,
    #[serde(default)]
    pub bot_name: Option<String>,
}

#[derive(Serialize)]
struct BotStarted {
    status: &'static str,
    meeting_id: i64,
    container_id: String,
}

#[derive(Serialize)]
struct BotStopped {
    status: &'static str,
    meeting_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    container_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /bots
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn request_bot(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedTenant>,
    payload: Result<Json<BotRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    // Malformed bodies are validation failures, not extractor rejections.
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    // 1–2. Canonicalize before touching any backing store.
    let platform: Platform = req.platform.parse()?;
    let key = MeetingKey::from_url(platform, &req.meeting_url, &auth.token)?;

    // 3. The lock is the source of truth for "a bot is active or starting".
    let ttl = Duration::from_secs(state.config.orchestrator.lock_ttl_secs);
    if !state.control.try_lock(&key, ttl).await? {
        tracing::warn!(meeting_key = %key, tenant_id = auth.tenant.id, "bot request conflict");
        return Err(ApiError(Error::Conflict {
            meeting_key: key.to_string(),
        }));
    }

    // From here on every failure must release the lock.
    match launch_locked(&state, &auth, &req, &key).await {
        Ok(response) => Ok(response),
        Err(e) => {
            if let Err(release_err) = state.control.release(&key).await {
                tracing::error!(meeting_key = %key, error = %release_err, "failed to release lock after launch error");
            }
            Err(ApiError(e))
        }
    }
}

/// Steps 4–6 of the bot request, run while holding the triple lock.
async fn launch_locked(
    state: &AppState,
    auth: &AuthedTenant,
    req: &BotRequest,
    key: &MeetingKey,
) -> Result<Response, Error> {
    // 4. Attach to the open meeting row for this triple, or create one.
    let meeting = match state.meetings.find_reusable(auth.tenant.id, key).await? {
        Some(meeting) => meeting,
        None => {
            state
                .meetings
                .create(auth.tenant.id, key, &req.meeting_url)
                .await?
        }
    };

    // 5. Launch the container.
    let connection_id = Uuid::new_v4().to_string();
    let bot = BotConfig {
        platform: key.platform,
        meeting_url: req.meeting_url.clone(),
        bot_name: req.bot_name.clone(),
        token: auth.token.clone(),
        connection_id,
        automatic_leave: AutomaticLeave::default(),
    };
    let spec = LaunchSpec::for_bot(&state.config.containers, &bot)?;

    let container_id = match state.driver.launch(&spec).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(meeting_key = %key, meeting_id = meeting.id, error = %e, "bot launch failed");
            if let Err(mark_err) = state
                .meetings
                .transition(meeting.id, MeetingStatus::Failed)
                .await
            {
                tracing::error!(meeting_id = meeting.id, error = %mark_err, "failed to mark meeting failed");
            }
            return Err(e);
        }
    };

    // 6. Record the live container, activate the meeting, reply.
    state.control.put_mapping(key, &container_id).await?;
    state
        .meetings
        .transition(meeting.id, MeetingStatus::Active)
        .await?;

    tracing::info!(
        meeting_key = %key,
        meeting_id = meeting.id,
        container_id = %container_id,
        container_name = %spec.name,
        "bot started"
    );

    Ok((
        StatusCode::CREATED,
        Json(BotStarted {
            status: "started",
            meeting_id: meeting.id,
            container_id,
        }),
    )
        .into_response())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /bots/:platform/:native_id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn stop_bot(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthedTenant>,
    Path((platform, native_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let platform: Platform = platform.parse()?;
    let key = MeetingKey::new(platform, native_id, auth.token.clone())?;

    let container_id = state.control.get_mapping(&key).await?;

    let Some(container_id) = container_id else {
        // No live bot. Release anyway — stop is idempotent and also the
        // recovery path for a lock whose launch never finished.
        state.control.release(&key).await?;
        let meeting = state.meetings.latest_for(auth.tenant.id, &key).await?;
        tracing::info!(meeting_key = %key, "stop requested but no bot mapping found");
        return Ok(Json(BotStopped {
            status: "not_found",
            meeting_id: meeting.map(|m| m.id),
            container_id: None,
        })
        .into_response());
    };

    // Stop the container; the lock and mapping go away regardless of how
    // that turns out.
    let stop_result = state.driver.stop(&container_id).await;
    state.control.release(&key).await?;

    let status = stop_status(&stop_result);
    if status == "stop_failed" {
        tracing::warn!(
            meeting_key = %key,
            container_id = %container_id,
            result = ?stop_result,
            "stop command failed, lock released anyway"
        );
    }

    let meeting = state.meetings.latest_for(auth.tenant.id, &key).await?;
    if let Some(ref meeting) = meeting {
        state
            .meetings
            .transition(meeting.id, MeetingStatus::Ended)
            .await?;
    }

    tracing::info!(
        meeting_key = %key,
        container_id = %container_id,
        status,
        "bot stop processed"
    );

    Ok(Json(BotStopped {
        status,
        meeting_id: meeting.map(|m| m.id),
        container_id: Some(container_id),
    })
    .into_response())
}

/// Reduce a driver stop result to the response status word. "Already
/// stopped" and "not found" count as stopped — the bot is gone either way.
fn stop_status(result: &sr_domain::Result<sr_containers::StopOutcome>) -> &'static str {
    match result {
        Ok(outcome) if outcome.is_success() => "stopped",
        _ => "stop_failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_containers::StopOutcome;

    #[test]
    fn gone_containers_still_count_as_stopped() {
        assert_eq!(stop_status(&Ok(StopOutcome::Stopped)), "stopped");
        assert_eq!(stop_status(&Ok(StopOutcome::NotFound)), "stopped");
    }

    #[test]
    fn engine_refusal_and_transport_errors_are_stop_failed() {
        assert_eq!(stop_status(&Ok(StopOutcome::Failed)), "stop_failed");
        assert_eq!(
            stop_status(&Err(Error::Unavailable("socket down".into()))),
            "stop_failed"
        );
    }

    #[test]
    fn unknown_platform_is_a_validation_error() {
        let raw = r#"{"platform": "webex", "meeting_url": "https://example.com"}"#;
        let req: BotRequest = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            req.platform.parse::<Platform>(),
            Err(Error::Validation(_))
        ));

        let raw = r#"{"platform": "google_meet", "meeting_url": "https://meet.google.com/abc-defg-hij"}"#;
        let req: BotRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.platform.parse::<Platform>().unwrap(), Platform::GoogleMeet);
        assert!(req.bot_name.is_none());
    }
}
