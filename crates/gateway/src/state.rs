use std::sync::Arc;

use sqlx::PgPool;

use sr_containers::ContainerDriver;
use sr_domain::config::Config;
use sr_store::{ControlStore, MeetingRepo, SegmentRepo, TenantRepo};

use crate::ingest::filter::SegmentFilter;

/// Shared application state passed to all handlers.
///
/// Fields are grouped by concern:
/// - **Config** — resolved at startup, immutable afterwards
/// - **Cluster state** — the Redis control store (locks, mappings, dedup)
/// - **Durable state** — Postgres repositories
/// - **Control plane** — the container driver seam
/// - **Ingest** — the informativeness filter
#[derive(Clone)]
pub struct AppState {
    // ── Config ────────────────────────────────────────────────────────
    pub config: Arc<Config>,

    // ── Cluster state ─────────────────────────────────────────────────
    pub control: ControlStore,

    // ── Durable state ─────────────────────────────────────────────────
    pub pool: PgPool,
    pub tenants: TenantRepo,
    pub meetings: MeetingRepo,
    pub segments: SegmentRepo,

    // ── Control plane ─────────────────────────────────────────────────
    pub driver: Arc<dyn ContainerDriver>,

    // ── Ingest ────────────────────────────────────────────────────────
    pub filter: Arc<SegmentFilter>,
}
