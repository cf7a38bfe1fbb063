//! The Redis control store.
//!
//! All cluster-wide mutable state lives here: triple locks, live container
//! mappings, and the segment dedup window. Every operation is a single
//! atomic key command (SET NX EX, SETEX, GET, DEL) — per-key linearizability
//! is the only ordering Redis needs to provide.
//!
//! Every call runs under a deadline; a timeout or connection error surfaces
//! as [`Error::Unavailable`] and is never retried here.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use sr_domain::{Error, MeetingKey, Result};

use crate::keys::{lock_key, map_key, segment_key};

/// Value stored under a segment key once the completed segment has been
/// handled (persisted or filtered). Anything else under that key is a
/// cached partial.
const PROCESSED: &str = "processed";

/// A partial (not yet completed) segment, cached transiently and never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedPartial {
    pub server_id: String,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub completed: bool,
}

#[derive(Clone)]
pub struct ControlStore {
    manager: ConnectionManager,
    op_timeout: Duration,
}

impl ControlStore {
    /// Connect and build the shared connection manager. The manager
    /// multiplexes one connection and reconnects on failure; clones are
    /// cheap handles onto it.
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::Unavailable(format!("redis: {e}")))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::Unavailable(format!("redis: {e}")))?;
        Ok(Self {
            manager,
            op_timeout,
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let mut con = self.manager.clone();
        self.deadline(redis::cmd("PING").query_async::<_, String>(&mut con))
            .await?;
        Ok(())
    }

    // ── Triple locks & mappings ─────────────────────────────────────

    /// Create-if-absent with expiry. Returns `true` when this caller now
    /// holds the lock, `false` when another bot is active or starting.
    pub async fn try_lock(&self, key: &MeetingKey, ttl: Duration) -> Result<bool> {
        let mut con = self.manager.clone();
        let reply: Option<String> = self
            .deadline(
                redis::cmd("SET")
                    .arg(lock_key(key))
                    .arg("1")
                    .arg("NX")
                    .arg("EX")
                    .arg(ttl.as_secs())
                    .query_async(&mut con),
            )
            .await?;
        if reply.is_none() {
            tracing::debug!(meeting_key = %key, "lock already held");
        }
        Ok(reply.is_some())
    }

    /// Delete the lock and the mapping for this triple. Idempotent —
    /// releasing a lock that does not exist is a success.
    pub async fn release(&self, key: &MeetingKey) -> Result<()> {
        let keys = [lock_key(key), map_key(key)];
        let mut con = self.manager.clone();
        self.deadline(con.del::<_, ()>(&keys[..])).await
    }

    /// Record the live container for a triple. Written only after a
    /// successful container start.
    pub async fn put_mapping(&self, key: &MeetingKey, container_id: &str) -> Result<()> {
        let mut con = self.manager.clone();
        self.deadline(con.set::<_, _, ()>(map_key(key), container_id))
            .await
    }

    pub async fn get_mapping(&self, key: &MeetingKey) -> Result<Option<String>> {
        let mut con = self.manager.clone();
        self.deadline(con.get(map_key(key))).await
    }

    // ── Segment dedup & partial cache ───────────────────────────────

    /// Whether the completed segment for this interval was already handled
    /// within the dedup window. A cached partial under the same key does
    /// NOT count — a completed frame must still supersede it.
    pub async fn completed_seen(&self, meeting_id: i64, start: f64, end: f64) -> Result<bool> {
        let mut con = self.manager.clone();
        let value: Option<String> = self
            .deadline(con.get(segment_key(meeting_id, start, end)))
            .await?;
        Ok(value.as_deref() == Some(PROCESSED))
    }

    /// Mark the interval handled (stored or filtered) for the dedup window.
    pub async fn mark_completed(
        &self,
        meeting_id: i64,
        start: f64,
        end: f64,
        ttl: Duration,
    ) -> Result<()> {
        let mut con = self.manager.clone();
        self.deadline(con.set_ex::<_, _, ()>(
            segment_key(meeting_id, start, end),
            PROCESSED,
            ttl.as_secs(),
        ))
        .await
    }

    /// Cache a partial segment, overwriting an earlier partial for the same
    /// interval. A key already marked `processed` wins — a late partial
    /// arriving after the completed frame is absorbed, not resurrected.
    pub async fn cache_partial(
        &self,
        meeting_id: i64,
        partial: &CachedPartial,
        ttl: Duration,
    ) -> Result<()> {
        let key = segment_key(meeting_id, partial.start_time, partial.end_time);
        let mut con = self.manager.clone();
        let existing: Option<String> = self.deadline(con.get(&key)).await?;
        if existing.as_deref() == Some(PROCESSED) {
            return Ok(());
        }
        let body = serde_json::to_string(partial)
            .map_err(|e| Error::Internal(format!("encoding partial segment: {e}")))?;
        self.deadline(con.set_ex::<_, _, ()>(&key, body, ttl.as_secs()))
            .await
    }

    // ── Helpers ─────────────────────────────────────────────────────

    async fn deadline<T>(
        &self,
        fut: impl std::future::Future<Output = redis::RedisResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(Error::Unavailable(format!("redis: {e}"))),
            Err(_) => Err(Error::Unavailable(format!(
                "redis: operation exceeded {:?}",
                self.op_timeout
            ))),
        }
    }
}
