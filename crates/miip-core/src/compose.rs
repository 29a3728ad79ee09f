//! docker-compose.yml loading and volume mount derivation.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{CoreError, Result};

/// Well-known compose file name, expected in the working directory.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// One service entry in the compose file. Only the keys the bootstrapper
/// consumes are modeled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeService {
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub volumes: Vec<String>,
}

impl ComposeService {
    /// Parsed volume mounts, skipping entries without a `host:container` split.
    pub fn mounts(&self) -> Vec<VolumeMount> {
        self.volumes
            .iter()
            .filter_map(|entry| VolumeMount::parse(entry))
            .collect()
    }
}

/// The loaded compose file: service name to definition (compose v1 layout,
/// services as top-level keys).
#[derive(Debug, Clone)]
pub struct ComposeFile {
    services: HashMap<String, ComposeService>,
}

impl ComposeFile {
    /// Load and parse the compose file. Any failure here is fatal and happens
    /// before the first side effect.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let services: HashMap<String, ComposeService> = serde_yaml::from_str(content)?;
        debug!(
            services = ?services.keys().collect::<Vec<_>>(),
            "Loaded compose file"
        );
        Ok(Self { services })
    }

    pub fn service(&self, name: &str) -> Result<&ComposeService> {
        self.services
            .get(name)
            .ok_or_else(|| CoreError::ServiceNotFound(name.to_string()))
    }
}

/// A parsed `"host:container"` volume entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMount {
    pub host: String,
    pub container: String,
}

impl VolumeMount {
    pub fn parse(entry: &str) -> Option<Self> {
        let (host, container) = entry.split_once(':')?;
        Some(Self {
            host: host.to_string(),
            container: container.to_string(),
        })
    }

    /// Container path of the mount backing the service's data directory,
    /// identified by a host path starting with `data`.
    pub fn data_dir(mounts: &[VolumeMount]) -> Option<&str> {
        mounts
            .iter()
            .find(|m| m.host.starts_with("data"))
            .map(|m| m.container.as_str())
    }

    /// Host path of the mount carrying the rendered shadow config,
    /// identified by a host path containing `shadow`.
    pub fn shadow_config_path(mounts: &[VolumeMount]) -> Option<&str> {
        mounts
            .iter()
            .find(|m| m.host.contains("shadow"))
            .map(|m| m.host.as_str())
    }
}
