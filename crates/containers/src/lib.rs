//! Bot containers: the driver seam over the host control plane and its
//! Docker Engine implementation.
//!
//! The driver is a trait so the orchestrator can be exercised against an
//! in-memory fake; production wires [`DockerDriver`], which speaks HTTP/1
//! to the engine over its local Unix socket.

pub mod docker;
pub mod launch;

pub use docker::DockerDriver;
pub use launch::LaunchSpec;

use async_trait::async_trait;

use sr_domain::Result;

/// Outcome of a stop request. "Already stopped" and "not found" count as
/// success — the bot is gone either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotFound,
    Failed,
}

impl StopOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, StopOutcome::Failed)
    }
}

#[async_trait]
pub trait ContainerDriver: Send + Sync {
    /// Create and start a bot container. Returns the container id. A
    /// control plane that refuses the launch is `Error::LaunchFailed`; an
    /// unreachable control plane is `Error::Unavailable`.
    async fn launch(&self, spec: &LaunchSpec) -> Result<String>;

    /// Stop a running container.
    async fn stop(&self, container_id: &str) -> Result<StopOutcome>;

    /// Startup probe. Fails fast when the control plane is unreachable.
    async fn ping(&self) -> Result<()>;
}
