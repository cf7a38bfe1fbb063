//! The ScribeRelay gateway: orchestrator API, tenant-scoped read API, and
//! the transcription-worker ingest endpoint, served from one axum app.

pub mod api;
pub mod cli;
pub mod ingest;
pub mod state;
