//! Shared domain types for ScribeRelay: configuration, the error taxonomy,
//! the platform enum with its meeting-URL canonicalizer, and the canonical
//! meeting key that scopes orchestrator locks cluster-wide.

pub mod config;
pub mod error;
pub mod meeting_key;
pub mod platform;

pub use error::{Error, Result};
pub use meeting_key::MeetingKey;
pub use platform::Platform;
