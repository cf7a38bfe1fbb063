/// Shared error type used across all ScribeRelay crates.
///
/// Each variant is a distinct failure *kind* that callers match on — the
/// orchestrator in particular must tell a conflict apart from an internal
/// failure because clients react to them differently.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No API key was presented on the request.
    #[error("missing API key")]
    MissingCredential,

    /// An API key was presented but matches no tenant.
    #[error("invalid API key")]
    InvalidCredential,

    /// Malformed input: bad meeting URL, unknown platform, missing fields.
    #[error("validation: {0}")]
    Validation(String),

    /// A bot is already active or starting for this meeting key.
    #[error("a bot is already active or starting for {meeting_key}")]
    Conflict { meeting_key: String },

    /// The requested record does not exist for this tenant.
    #[error("not found: {0}")]
    NotFound(String),

    /// Redis, the database, or the container control plane is unreachable
    /// or timed out. Transient; surfaced to the caller, never retried
    /// in-process.
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    /// The container control plane refused to create or start the bot.
    #[error("bot launch failed: {0}")]
    LaunchFailed(String),

    /// Anything else. Reported to the caller as an internal error.
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
