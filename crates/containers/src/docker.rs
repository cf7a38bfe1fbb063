//! Docker Engine driver: HTTP/1 over the local Unix socket.
//!
//! One `UnixStream` per request — the engine handles this fine at our call
//! rates, and it keeps the driver free of connection-pool state. Every call
//! runs under the configured deadline; transport failures are
//! `Error::Unavailable`, while an engine that answers but refuses the
//! launch is `Error::LaunchFailed`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;

use sr_domain::config::ContainersConfig;
use sr_domain::{Error, Result};

use crate::{ContainerDriver, LaunchSpec, StopOutcome};

pub struct DockerDriver {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DockerDriver {
    pub fn new(containers: &ContainersConfig) -> Self {
        Self {
            socket_path: PathBuf::from(&containers.socket_path),
            timeout: Duration::from_secs(containers.request_timeout_secs),
        }
    }

    /// Send one request over a fresh socket connection and collect the
    /// response. The whole exchange shares a single deadline.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(u16, Bytes)> {
        let exchange = async {
            let stream = UnixStream::connect(&self.socket_path)
                .await
                .map_err(|e| unavailable(&self.socket_path, e))?;
            let io = TokioIo::new(stream);
            let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
                .await
                .map_err(|e| Error::Unavailable(format!("control plane handshake: {e}")))?;
            // Drive the connection until the exchange completes.
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(error = %e, "control plane connection closed");
                }
            });

            let payload = match body {
                Some(value) => Bytes::from(value.to_string()),
                None => Bytes::new(),
            };
            let request = Request::builder()
                .method(method)
                .uri(path)
                .header(hyper::header::HOST, "docker")
                .header(hyper::header::CONTENT_TYPE, "application/json")
                .body(Full::new(payload))
                .map_err(|e| Error::Internal(format!("building control plane request: {e}")))?;

            let response = sender
                .send_request(request)
                .await
                .map_err(|e| Error::Unavailable(format!("control plane request: {e}")))?;
            let status = response.status().as_u16();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|e| Error::Unavailable(format!("control plane response: {e}")))?
                .to_bytes();
            Ok((status, bytes))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(Error::Unavailable(format!(
                "control plane call exceeded {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl ContainerDriver for DockerDriver {
    async fn launch(&self, spec: &LaunchSpec) -> Result<String> {
        // Auto-removal stays off so a failed bot can be post-mortemed.
        let create_payload = serde_json::json!({
            "Image": spec.image,
            "Env": spec.env,
            "HostConfig": {
                "NetworkMode": spec.network,
                "AutoRemove": false,
            },
        });

        let create_path = format!("/containers/create?name={}", spec.name);
        let (status, body) = self
            .request(Method::POST, &create_path, Some(create_payload))
            .await?;
        if status != 201 {
            return Err(Error::LaunchFailed(format!(
                "create returned {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        let created: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| Error::LaunchFailed(format!("unparseable create response: {e}")))?;
        let container_id = created["Id"]
            .as_str()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::LaunchFailed("create response carried no container id".into()))?
            .to_string();

        let start_path = format!("/containers/{container_id}/start");
        let (status, body) = self.request(Method::POST, &start_path, None).await?;
        if status != 204 {
            return Err(Error::LaunchFailed(format!(
                "start of {container_id} returned {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        Ok(container_id)
    }

    async fn stop(&self, container_id: &str) -> Result<StopOutcome> {
        let path = format!("/containers/{container_id}/stop");
        let (status, _body) = self.request(Method::POST, &path, None).await?;
        Ok(stop_outcome(status))
    }

    async fn ping(&self) -> Result<()> {
        let (status, _body) = self.request(Method::GET, "/version", None).await?;
        if status == 200 {
            Ok(())
        } else {
            Err(Error::Unavailable(format!(
                "control plane version probe returned {status}"
            )))
        }
    }
}

/// Map the engine's stop status codes: 204 stopped, 304 already stopped,
/// 404 gone entirely — all three mean the bot is no longer running.
pub fn stop_outcome(status: u16) -> StopOutcome {
    match status {
        204 | 304 => StopOutcome::Stopped,
        404 => StopOutcome::NotFound,
        _ => StopOutcome::Failed,
    }
}

fn unavailable(socket_path: &std::path::Path, e: std::io::Error) -> Error {
    Error::Unavailable(format!(
        "control plane socket {}: {e}",
        socket_path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_treats_gone_containers_as_success() {
        assert_eq!(stop_outcome(204), StopOutcome::Stopped);
        assert_eq!(stop_outcome(304), StopOutcome::Stopped);
        assert_eq!(stop_outcome(404), StopOutcome::NotFound);
        assert!(stop_outcome(304).is_success());
        assert!(stop_outcome(404).is_success());
    }

    #[test]
    fn stop_surfaces_engine_errors() {
        assert_eq!(stop_outcome(500), StopOutcome::Failed);
        assert_eq!(stop_outcome(409), StopOutcome::Failed);
        assert!(!stop_outcome(500).is_success());
    }
}
