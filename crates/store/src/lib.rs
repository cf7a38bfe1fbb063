//! Backing stores: the Redis control store (cluster-wide locks, live
//! container mappings, segment dedup) and the Postgres repositories
//! (tenants, meetings, transcript segments).
//!
//! Reads of tenant data never touch Redis; orchestration state never
//! touches Postgres except for Meeting status transitions. Every store
//! error surfaces as [`sr_domain::Error::Unavailable`] — callers do not
//! retry in-process.

pub mod control;
pub mod keys;
pub mod models;
pub mod repo;

pub use control::ControlStore;
pub use models::{Meeting, MeetingStatus, Tenant, TranscriptSegment};
pub use repo::{MeetingRepo, NewSegment, SegmentRepo, TenantRepo};

/// Embedded sqlx migrations, applied at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
