//! Segment processing: validate → dedup → filter → persist.
//!
//! One inbound frame becomes at most one database transaction. Segments on
//! a single connection are processed in arrival order; across connections
//! the `(meeting_id, start_time, end_time)` uniqueness key resolves any
//! interleaving, so no cross-connection ordering is needed.
//!
//! Partial (not yet completed) segments never reach the database — they are
//! cached in Redis for up to thirty minutes and overwritten as the worker
//! revises them. Only frames the worker marks `completed` become durable.

use std::time::Duration;

use sr_domain::{Error, Result};
use sr_protocol::TranscriptFrame;
use sr_store::control::CachedPartial;
use sr_store::NewSegment;

use crate::state::AppState;

pub async fn process_frame(state: &AppState, server_id: &str, frame: TranscriptFrame) -> Result<()> {
    let meeting = state
        .meetings
        .get(frame.meeting_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("meeting {} does not exist", frame.meeting_id)))?;

    let dedup_ttl = Duration::from_secs(state.config.ingest.dedup_ttl_secs);
    let partial_ttl = Duration::from_secs(state.config.ingest.partial_ttl_secs);

    let total = frame.segments.len();
    let mut to_store = Vec::new();
    let mut skipped = 0usize;
    let mut partials = 0usize;
    let mut duplicates = 0usize;
    let mut filtered = 0usize;

    for segment in &frame.segments {
        // 1. A segment without timestamps or text is unprocessable.
        let (Some(start), Some(end), Some(text)) = (
            segment.start_time,
            segment.end_time,
            segment.text.as_deref(),
        ) else {
            skipped += 1;
            continue;
        };

        // Partials are revisions in flight: cache and move on.
        if !segment.completed {
            let partial = CachedPartial {
                server_id: server_id.to_string(),
                start_time: start,
                end_time: end,
                text: text.to_string(),
                language: segment.language.clone(),
                completed: false,
            };
            state
                .control
                .cache_partial(meeting.id, &partial, partial_ttl)
                .await?;
            partials += 1;
            continue;
        }

        // 2. Drop re-ingested completed segments within the dedup window.
        if state.control.completed_seen(meeting.id, start, end).await? {
            duplicates += 1;
            continue;
        }
        // The key is written even when the filter drops the segment, so a
        // retry of uninformative text is absorbed the same way.
        state
            .control
            .mark_completed(meeting.id, start, end, dedup_ttl)
            .await?;

        // 3. Informativeness filter.
        if !state.filter.is_informative(text) {
            tracing::debug!(
                meeting_id = meeting.id,
                text,
                "filtered non-informative segment"
            );
            filtered += 1;
            continue;
        }

        // 4. Candidate for durable storage.
        to_store.push(NewSegment {
            meeting_id: meeting.id,
            start_time: start,
            end_time: end,
            text: text.to_string(),
            language: segment.language.clone(),
        });
    }

    // One transaction per frame; uniqueness conflicts are dedup-window
    // misses and are ignored inside the insert.
    let inserted = state.segments.insert_batch(&to_store).await?;

    tracing::debug!(
        server_id,
        meeting_id = meeting.id,
        total,
        inserted,
        partials,
        duplicates,
        filtered,
        skipped,
        "frame processed"
    );

    Ok(())
}
