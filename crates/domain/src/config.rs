//! Runtime configuration.
//!
//! Every knob has a serde default so a config document may specify only what
//! it overrides; [`Config::from_env`] builds the same structure from the
//! process environment, which is how the deployed binary is configured:
//!
//! | Env var | Field |
//! |---|---|
//! | `HOST` / `PORT`          | `server.host` / `server.port` |
//! | `REDIS_HOST` / `REDIS_PORT` | `redis.host` / `redis.port` |
//! | `DATABASE_URL`           | `database.url` |
//! | `BOT_IMAGE_NAME`         | `containers.image` |
//! | `DOCKER_NETWORK`         | `containers.network` |
//! | `DOCKER_SOCKET_PATH`     | `containers.socket_path` |
//! | `TRANSCRIPTION_SERVICE`  | `containers.transcription_url` |
//! | `SR_LOCK_TTL_SECS`       | `orchestrator.lock_ttl_secs` |
//! | `LOG_LEVEL`              | consumed by the binary's tracing init |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub containers: ContainersConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_8080")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: d_host(),
            port: 8080,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Redis
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "d_redis_host")]
    pub host: String,
    #[serde(default = "d_6379")]
    pub port: u16,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: d_redis_host(),
            port: 6379,
        }
    }
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Database
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres DSN, e.g. `postgres://scriberelay:secret@db:5432/scriberelay`.
    #[serde(default)]
    pub url: String,
    #[serde(default = "d_10")]
    pub max_connections: u32,
    #[serde(default = "d_5")]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Container control plane
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainersConfig {
    /// Image the bot workers run.
    #[serde(default = "d_bot_image")]
    pub image: String,
    /// Named network shared with the transcription workers, so bots can
    /// reach them by service name.
    #[serde(default = "d_network")]
    pub network: String,
    /// Control-plane Unix socket.
    #[serde(default = "d_socket")]
    pub socket_path: String,
    /// WebSocket URL the bot streams captured audio to.
    #[serde(default = "d_transcription_url")]
    pub transcription_url: String,
    /// Deadline for each control-plane call.
    #[serde(default = "d_30")]
    pub request_timeout_secs: u64,
}

impl Default for ContainersConfig {
    fn default() -> Self {
        Self {
            image: d_bot_image(),
            network: d_network(),
            socket_path: d_socket(),
            transcription_url: d_transcription_url(),
            request_timeout_secs: 30,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// TTL of the per-meeting lock key. Must exceed the longest plausible
    /// bot launch; it is the crash backstop, not the normal release path.
    #[serde(default = "d_600")]
    pub lock_ttl_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { lock_ttl_secs: 600 }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Ingest
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Dedup window for completed segments.
    #[serde(default = "d_300")]
    pub dedup_ttl_secs: u64,
    /// Retention for partial (not yet completed) segments.
    #[serde(default = "d_1800")]
    pub partial_ttl_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            dedup_ttl_secs: 300,
            partial_ttl_secs: 1800,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Environment loading & validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl Config {
    /// Build a config from the process environment, falling back to the
    /// serde defaults for anything unset.
    pub fn from_env() -> Self {
        let mut cfg = Config::default();
        if let Some(v) = env_str("HOST") {
            cfg.server.host = v;
        }
        if let Some(v) = env_parse::<u16>("PORT") {
            cfg.server.port = v;
        }
        if let Some(v) = env_str("REDIS_HOST") {
            cfg.redis.host = v;
        }
        if let Some(v) = env_parse::<u16>("REDIS_PORT") {
            cfg.redis.port = v;
        }
        if let Some(v) = env_str("DATABASE_URL") {
            cfg.database.url = v;
        }
        if let Some(v) = env_str("BOT_IMAGE_NAME") {
            cfg.containers.image = v;
        }
        if let Some(v) = env_str("DOCKER_NETWORK") {
            cfg.containers.network = v;
        }
        if let Some(v) = env_str("DOCKER_SOCKET_PATH") {
            cfg.containers.socket_path = v;
        }
        if let Some(v) = env_str("TRANSCRIPTION_SERVICE") {
            cfg.containers.transcription_url = v;
        }
        if let Some(v) = env_parse::<u64>("SR_LOCK_TTL_SECS") {
            cfg.orchestrator.lock_ttl_secs = v;
        }
        cfg
    }

    /// Sanity-check the resolved configuration. The caller decides what to
    /// do with warnings; startup must bail on any `Error`-severity issue.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.database.url.is_empty() {
            issues.push(ConfigIssue::error("database.url (DATABASE_URL) is not set"));
        }
        if self.containers.image.is_empty() {
            issues.push(ConfigIssue::error(
                "containers.image (BOT_IMAGE_NAME) is not set",
            ));
        }
        if self.orchestrator.lock_ttl_secs == 0 {
            issues.push(ConfigIssue::error("orchestrator.lock_ttl_secs must be > 0"));
        }
        if self.ingest.partial_ttl_secs < self.ingest.dedup_ttl_secs {
            issues.push(ConfigIssue::warning(
                "ingest.partial_ttl_secs is shorter than the completed-segment dedup window",
            ));
        }
        if !self.containers.transcription_url.starts_with("ws://")
            && !self.containers.transcription_url.starts_with("wss://")
        {
            issues.push(ConfigIssue::warning(
                "containers.transcription_url is not a ws:// or wss:// URL",
            ));
        }
        issues
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl ConfigIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            ConfigSeverity::Warning => write!(f, "warning: {}", self.message),
            ConfigSeverity::Error => write!(f, "error: {}", self.message),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_host() -> String {
    "0.0.0.0".into()
}
fn d_8080() -> u16 {
    8080
}
fn d_redis_host() -> String {
    "redis".into()
}
fn d_6379() -> u16 {
    6379
}
fn d_10() -> u32 {
    10
}
fn d_5() -> u64 {
    5
}
fn d_30() -> u64 {
    30
}
fn d_300() -> u64 {
    300
}
fn d_600() -> u64 {
    600
}
fn d_1800() -> u64 {
    1800
}
fn d_bot_image() -> String {
    "scriberelay-bot:latest".into()
}
fn d_network() -> String {
    "scriberelay_default".into()
}
fn d_socket() -> String {
    "/var/run/docker.sock".into()
}
fn d_transcription_url() -> String {
    "ws://transcriber:9090".into()
}

fn env_str(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_str(name).and_then(|v| v.parse().ok())
}
