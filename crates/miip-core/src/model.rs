//! Service identity and the derived per-service descriptor.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::compose::{ComposeFile, VolumeMount};
use crate::error::{CoreError, Result};

/// The three deployable services the bootstrapper knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Archive,
    ArchiveReceiver,
    ResearchPlatform,
}

impl ServiceKind {
    /// Fixed processing order, independent of the order given on the
    /// command line.
    pub const PROCESSING_ORDER: [ServiceKind; 3] = [
        ServiceKind::Archive,
        ServiceKind::ArchiveReceiver,
        ServiceKind::ResearchPlatform,
    ];

    /// Compose file key and CLI token for this service.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Archive => "archive",
            ServiceKind::ArchiveReceiver => "archive-receiver",
            ServiceKind::ResearchPlatform => "research-platform",
        }
    }

    /// Archive services own their database. The research platform only gets
    /// a user; its installer insists on creating the database itself.
    pub fn owns_database(self) -> bool {
        !matches!(self, ServiceKind::ResearchPlatform)
    }

    pub fn template_path(self) -> &'static str {
        match self {
            ServiceKind::Archive | ServiceKind::ArchiveReceiver => "archive.template.json",
            ServiceKind::ResearchPlatform => "research-platform/platform.config.template",
        }
    }

    /// Output path for services whose config lands at a fixed location.
    /// Archive services derive theirs from the volume list instead.
    pub fn fixed_output_path(self) -> Option<&'static str> {
        match self {
            ServiceKind::ResearchPlatform => Some("research-platform/platform.shadow.config"),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = CoreError;

    fn from_str(token: &str) -> Result<Self> {
        match token {
            "archive" => Ok(ServiceKind::Archive),
            "archive-receiver" => Ok(ServiceKind::ArchiveReceiver),
            "research-platform" => Ok(ServiceKind::ResearchPlatform),
            other => Err(CoreError::UnknownService(other.to_string())),
        }
    }
}

/// Resolved view over one service's compose entry, built once before any
/// side effect.
#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub kind: ServiceKind,
    pub environment: HashMap<String, String>,
    pub data_dir: Option<String>,
    pub shadow_config_path: Option<String>,
}

impl ServiceDescriptor {
    pub fn from_compose(kind: ServiceKind, compose: &ComposeFile) -> Result<Self> {
        let service = compose.service(kind.as_str())?;
        let mounts = service.mounts();
        Ok(Self {
            kind,
            environment: service.environment.clone(),
            data_dir: VolumeMount::data_dir(&mounts).map(str::to_string),
            shadow_config_path: VolumeMount::shadow_config_path(&mounts).map(str::to_string),
        })
    }

    fn env(&self, key: &str) -> Result<&str> {
        self.environment
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| CoreError::MissingEnvKey {
                service: self.kind.as_str().to_string(),
                key: key.to_string(),
            })
    }

    pub fn db_user(&self) -> Result<&str> {
        self.env("DB_USER")
    }

    pub fn db_password(&self) -> Result<&str> {
        self.env("DB_PASSWORD")
    }

    pub fn db_name(&self) -> Result<&str> {
        self.env("DB_NAME")
    }

    /// Where the rendered config goes: the fixed path when the service has
    /// one, otherwise the derived shadow mount.
    pub fn output_path(&self) -> Result<&str> {
        if let Some(fixed) = self.kind.fixed_output_path() {
            return Ok(fixed);
        }
        self.shadow_config_path
            .as_deref()
            .ok_or_else(|| CoreError::MissingShadowMount(self.kind.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSE_YAML: &str = r#"
archive:
  environment:
    DB_USER: archive
    DB_PASSWORD: secret
    DB_NAME: archive_db
  volumes:
    - "data:/var/data"
    - "config/shadow.json:/cfg/shadow.json"

research-platform:
  environment:
    DB_USER: platform
    DB_PASSWORD: secret
    DB_NAME: platform_db
"#;

    fn compose() -> ComposeFile {
        ComposeFile::from_yaml(COMPOSE_YAML).unwrap()
    }

    #[test]
    fn test_service_tokens_round_trip() {
        for kind in ServiceKind::PROCESSING_ORDER {
            assert_eq!(kind.as_str().parse::<ServiceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let err = "frontend".parse::<ServiceKind>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownService(_)));
    }

    #[test]
    fn test_database_ownership() {
        assert!(ServiceKind::Archive.owns_database());
        assert!(ServiceKind::ArchiveReceiver.owns_database());
        assert!(!ServiceKind::ResearchPlatform.owns_database());
    }

    #[test]
    fn test_descriptor_derives_paths() {
        let descriptor = ServiceDescriptor::from_compose(ServiceKind::Archive, &compose()).unwrap();

        assert_eq!(descriptor.data_dir.as_deref(), Some("/var/data"));
        assert_eq!(descriptor.output_path().unwrap(), "config/shadow.json");
        assert_eq!(descriptor.db_user().unwrap(), "archive");
    }

    #[test]
    fn test_descriptor_fixed_output_path() {
        let descriptor =
            ServiceDescriptor::from_compose(ServiceKind::ResearchPlatform, &compose()).unwrap();

        assert_eq!(
            descriptor.output_path().unwrap(),
            "research-platform/platform.shadow.config"
        );
    }

    #[test]
    fn test_descriptor_missing_service() {
        let compose = ComposeFile::from_yaml("archive:\n  environment: {}\n").unwrap();
        let err = ServiceDescriptor::from_compose(ServiceKind::ResearchPlatform, &compose)
            .unwrap_err();
        assert!(matches!(err, CoreError::ServiceNotFound(_)));
    }

    #[test]
    fn test_descriptor_missing_env_key() {
        let compose = ComposeFile::from_yaml("archive:\n  environment:\n    DB_USER: a\n").unwrap();
        let descriptor = ServiceDescriptor::from_compose(ServiceKind::Archive, &compose).unwrap();

        assert!(descriptor.db_user().is_ok());
        let err = descriptor.db_password().unwrap_err();
        assert!(matches!(err, CoreError::MissingEnvKey { .. }));
    }

    #[test]
    fn test_archive_without_shadow_mount_has_no_output_path() {
        let compose = ComposeFile::from_yaml("archive:\n  volumes:\n    - \"data:/var/data\"\n")
            .unwrap();
        let descriptor = ServiceDescriptor::from_compose(ServiceKind::Archive, &compose).unwrap();

        let err = descriptor.output_path().unwrap_err();
        assert!(matches!(err, CoreError::MissingShadowMount(_)));
    }
}
