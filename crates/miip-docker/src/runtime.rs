//! docker-compose CLI wrapper
//!
//! Resolves the container backing a compose service by shelling out to
//! `docker-compose ps -q <name>`. The argument shape is the wire contract
//! with the surrounding deployment repository and must not change.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{DockerError, Result};

/// docker-compose CLI wrapper.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeCli;

impl ComposeCli {
    pub fn new() -> Self {
        Self
    }

    /// Container id of the running container backing `name`, trimmed of the
    /// trailing newline. An empty string means the service is not running;
    /// that is not an error at this layer.
    pub async fn container_id(&self, name: &str) -> Result<String> {
        let mut cmd = Command::new("docker-compose");
        cmd.args(["ps", "-q", name]);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!("Running: docker-compose ps -q {}", name);

        let output = cmd.output().await.map_err(|source| DockerError::Spawn {
            command: format!("docker-compose ps -q {name}"),
            source,
        })?;

        if !output.status.success() {
            return Err(DockerError::CommandFailed {
                command: format!("docker-compose ps -q {name}"),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(service = %name, id = %id, "Resolved container id");
        Ok(id)
    }

    /// Like [`ComposeCli::container_id`], but fails when the service has no
    /// running container instead of handing an empty id to downstream
    /// commands.
    pub async fn require_container_id(&self, name: &str) -> Result<String> {
        let id = self.container_id(name).await?;
        if id.is_empty() {
            return Err(DockerError::ContainerNotRunning(name.to_string()));
        }
        Ok(id)
    }
}
