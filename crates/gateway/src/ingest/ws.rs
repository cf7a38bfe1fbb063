//! WebSocket endpoint for transcription-worker connections.
//!
//! Flow:
//! 1. Worker connects to `GET /collector` and holds the connection open.
//! 2. Each text frame is one `TranscriptFrame`; frames are processed in
//!    arrival order.
//! 3. A malformed or unprocessable frame gets an error reply on the
//!    reverse channel; the connection stays open.
//! 4. Disconnects are normal — the worker reconnects and resumes.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use uuid::Uuid;

use sr_protocol::{CollectorReply, TranscriptFrame};

use crate::ingest::processor::process_frame;
use crate::state::AppState;

/// GET /collector — upgrade to WebSocket.
pub async fn collector_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    // Server-side connection id, used only for logging and correlation.
    let server_id = Uuid::new_v4().to_string();
    tracing::info!(server_id = %server_id, "transcription worker connected");

    let (mut ws_sink, mut ws_stream) = socket.split();

    while let Some(Ok(msg)) = ws_stream.next().await {
        match msg {
            Message::Text(text) => {
                let error = match serde_json::from_str::<TranscriptFrame>(&text) {
                    Ok(frame) => match process_frame(&state, &server_id, frame).await {
                        Ok(()) => None,
                        Err(e) => {
                            tracing::warn!(server_id = %server_id, error = %e, "frame processing failed");
                            Some(e.to_string())
                        }
                    },
                    Err(e) => {
                        tracing::warn!(server_id = %server_id, error = %e, "unparseable frame");
                        Some(format!("invalid frame: {e}"))
                    }
                };

                if let Some(message) = error {
                    if send_reply(&mut ws_sink, &CollectorReply::Error { message })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
            Message::Close(_) => break,
            // axum answers WS-level pings automatically.
            Message::Ping(_) | Message::Pong(_) => {}
            _ => {}
        }
    }

    tracing::info!(server_id = %server_id, "transcription worker disconnected");
}

async fn send_reply(
    sink: &mut SplitSink<WebSocket, Message>,
    reply: &CollectorReply,
) -> Result<(), ()> {
    let json = serde_json::to_string(reply).map_err(|_| ())?;
    sink.send(Message::Text(json)).await.map_err(|_| ())
}
