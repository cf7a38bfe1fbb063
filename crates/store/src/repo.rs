//! Postgres repositories. All queries are single indexed statements; the
//! only multi-statement write is the per-frame segment batch, which runs in
//! one transaction and leans on the uniqueness constraint for idempotence.

use sqlx::PgPool;

use sr_domain::{Error, MeetingKey, Result};

use crate::models::{Meeting, MeetingStatus, Tenant, TranscriptSegment};

fn db_err(e: sqlx::Error) -> Error {
    Error::Unavailable(format!("database: {e}"))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tenants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct TenantRepo {
    pool: PgPool,
}

impl TenantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve an opaque API token to its tenant. One indexed lookup;
    /// `None` means the token is unknown. Never caches negatively.
    pub async fn resolve_token(&self, token: &str) -> Result<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>(
            "SELECT u.id, u.email, u.name, u.created_at
             FROM users u
             JOIN api_tokens t ON t.user_id = u.id
             WHERE t.token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Meetings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct MeetingRepo {
    pool: PgPool,
}

impl MeetingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The meeting row a new bot request should attach to: the newest
    /// `requested`/`active` row for this tenant's triple, if any. Rows in a
    /// terminal state are never reused — a relaunch gets a fresh row.
    pub async fn find_reusable(&self, user_id: i64, key: &MeetingKey) -> Result<Option<Meeting>> {
        sqlx::query_as::<_, Meeting>(
            "SELECT * FROM meetings
             WHERE user_id = $1 AND platform = $2 AND platform_specific_id = $3
               AND status IN ('requested', 'active')
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(key.platform.as_str())
        .bind(&key.native_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    pub async fn create(
        &self,
        user_id: i64,
        key: &MeetingKey,
        meeting_url: &str,
    ) -> Result<Meeting> {
        sqlx::query_as::<_, Meeting>(
            "INSERT INTO meetings (user_id, platform, platform_specific_id, meeting_url, status)
             VALUES ($1, $2, $3, $4, 'requested')
             RETURNING *",
        )
        .bind(user_id)
        .bind(key.platform.as_str())
        .bind(&key.native_id)
        .bind(meeting_url)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Advance a meeting's status. The WHERE clause enforces the one-way
    /// lifecycle — a row already past `to` is left untouched. Returns
    /// whether a row actually moved.
    pub async fn transition(&self, meeting_id: i64, to: MeetingStatus) -> Result<bool> {
        let allowed: Vec<String> = to.allowed_from().iter().map(|s| s.to_string()).collect();
        let result = sqlx::query(
            "UPDATE meetings SET status = $2, updated_at = NOW()
             WHERE id = $1 AND status = ANY($3)",
        )
        .bind(meeting_id)
        .bind(to.as_str())
        .bind(&allowed)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    /// The most recent meeting for a tenant's (platform, native id) pair,
    /// any status. Reads pick the latest row across relaunches.
    pub async fn latest_for(&self, user_id: i64, key: &MeetingKey) -> Result<Option<Meeting>> {
        sqlx::query_as::<_, Meeting>(
            "SELECT * FROM meetings
             WHERE user_id = $1 AND platform = $2 AND platform_specific_id = $3
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(key.platform.as_str())
        .bind(&key.native_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)
    }

    pub async fn list_for_tenant(&self, user_id: i64) -> Result<Vec<Meeting>> {
        sqlx::query_as::<_, Meeting>(
            "SELECT * FROM meetings
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }

    /// Existence check used by the ingestor before accepting segments.
    pub async fn get(&self, meeting_id: i64) -> Result<Option<Meeting>> {
        sqlx::query_as::<_, Meeting>("SELECT * FROM meetings WHERE id = $1")
            .bind(meeting_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transcript segments
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A completed segment ready for durable storage.
#[derive(Debug, Clone)]
pub struct NewSegment {
    pub meeting_id: i64,
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub language: Option<String>,
}

#[derive(Clone)]
pub struct SegmentRepo {
    pool: PgPool,
}

impl SegmentRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a batch of segments in a single transaction. Conflicts on
    /// `(meeting_id, start_time, end_time)` are silently ignored — they are
    /// dedup-window misses, not errors. Returns the number actually
    /// inserted.
    pub async fn insert_batch(&self, segments: &[NewSegment]) -> Result<u64> {
        if segments.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let mut inserted = 0u64;
        for seg in segments {
            let result = sqlx::query(
                "INSERT INTO transcriptions (meeting_id, start_time, end_time, text, language)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (meeting_id, start_time, end_time) DO NOTHING",
            )
            .bind(seg.meeting_id)
            .bind(seg.start_time)
            .bind(seg.end_time)
            .bind(&seg.text)
            .bind(&seg.language)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(db_err)?;
        Ok(inserted)
    }

    /// All segments of a meeting, ascending by start time.
    pub async fn for_meeting(&self, meeting_id: i64) -> Result<Vec<TranscriptSegment>> {
        sqlx::query_as::<_, TranscriptSegment>(
            "SELECT * FROM transcriptions
             WHERE meeting_id = $1
             ORDER BY start_time ASC, end_time ASC",
        )
        .bind(meeting_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)
    }
}
