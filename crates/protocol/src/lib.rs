//! Wire types shared between the gateway, the bot containers, and the
//! transcription workers.
//!
//! Two contracts live here:
//! - the **collector protocol**: framed JSON messages a transcription worker
//!   pushes over its persistent WebSocket connection, and the per-message
//!   error replies the gateway sends back;
//! - the **launch contract**: the `BOT_CONFIG` document injected into every
//!   bot container's environment.

use serde::{Deserialize, Serialize};

use sr_domain::Platform;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Collector protocol (worker → gateway)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One inbound frame from a transcription worker. The schema is closed:
/// frames with extra fields are rejected at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptFrame {
    /// Internal meeting id the segments belong to.
    pub meeting_id: i64,
    pub segments: Vec<SegmentPayload>,
}

/// A single transcribed interval. `start_time`, `end_time` and `text` are
/// required for processing but optional on the wire — the processor drops
/// incomplete segments instead of failing the whole frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentPayload {
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// The worker's assertion that this segment will not be revised and is
    /// safe to persist. Partials (`false`) are retained transiently only.
    #[serde(default)]
    pub completed: bool,
}

/// Gateway → worker reply. Only errors are reported; accepted frames are
/// not acknowledged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CollectorReply {
    Error { message: String },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Launch contract (gateway → bot container)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The `BOT_CONFIG` environment document. Field names are part of the bot
/// image's contract and must stay camelCase on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub platform: Platform,
    pub meeting_url: String,
    pub bot_name: Option<String>,
    pub token: String,
    /// Unique per-launch connection id the bot presents to the
    /// transcription worker.
    pub connection_id: String,
    pub automatic_leave: AutomaticLeave,
}

/// Automatic-leave timeouts, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticLeave {
    #[serde(default = "d_leave_ms")]
    pub waiting_room_timeout: u64,
    #[serde(default = "d_leave_ms")]
    pub no_one_joined_timeout: u64,
    #[serde(default = "d_leave_ms")]
    pub everyone_left_timeout: u64,
}

impl Default for AutomaticLeave {
    fn default() -> Self {
        Self {
            waiting_room_timeout: d_leave_ms(),
            no_one_joined_timeout: d_leave_ms(),
            everyone_left_timeout: d_leave_ms(),
        }
    }
}

fn d_leave_ms() -> u64 {
    300_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_parses_from_worker_json() {
        let raw = r#"{
            "meeting_id": 42,
            "segments": [
                {"start_time": 1.0, "end_time": 2.0, "text": "Hello world", "completed": true},
                {"start_time": 2.0, "end_time": 3.5, "text": "partial...", "language": "en"}
            ]
        }"#;
        let frame: TranscriptFrame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.meeting_id, 42);
        assert_eq!(frame.segments.len(), 2);
        assert!(frame.segments[0].completed);
        assert!(!frame.segments[1].completed);
        assert_eq!(frame.segments[1].language.as_deref(), Some("en"));
    }

    #[test]
    fn frame_rejects_unknown_fields() {
        let raw = r#"{"meeting_id": 1, "segments": [], "speaker": "alice"}"#;
        assert!(serde_json::from_str::<TranscriptFrame>(raw).is_err());
    }

    #[test]
    fn segment_tolerates_missing_fields() {
        let raw = r#"{"meeting_id": 1, "segments": [{"text": "no timestamps"}]}"#;
        let frame: TranscriptFrame = serde_json::from_str(raw).unwrap();
        assert!(frame.segments[0].start_time.is_none());
        assert!(frame.segments[0].end_time.is_none());
    }

    #[test]
    fn error_reply_wire_shape() {
        let reply = CollectorReply::Error {
            message: "Invalid JSON format".into(),
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "error", "message": "Invalid JSON format"})
        );
    }

    #[test]
    fn bot_config_is_camel_case() {
        let config = BotConfig {
            platform: Platform::GoogleMeet,
            meeting_url: "https://meet.google.com/abc-defg-hij".into(),
            bot_name: None,
            token: "tok".into(),
            connection_id: "11111111-2222-3333-4444-555555555555".into(),
            automatic_leave: AutomaticLeave::default(),
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["platform"], "google_meet");
        assert_eq!(json["meetingUrl"], "https://meet.google.com/abc-defg-hij");
        assert_eq!(json["connectionId"], "11111111-2222-3333-4444-555555555555");
        assert_eq!(json["automaticLeave"]["waitingRoomTimeout"], 300_000);
        assert_eq!(json["automaticLeave"]["noOneJoinedTimeout"], 300_000);
        assert_eq!(json["automaticLeave"]["everyoneLeftTimeout"], 300_000);
    }
}
