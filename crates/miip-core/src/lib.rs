//! Core model for the MIIP bootstrapper
//!
//! Loads the docker-compose environment description, derives per-service
//! descriptors (database credentials, data directory, shadow config path)
//! and renders config templates with Tera.

pub mod compose;
pub mod error;
pub mod model;
pub mod template;

pub use compose::{COMPOSE_FILE, ComposeFile, ComposeService, VolumeMount};
pub use error::{CoreError, Result};
pub use model::{ServiceDescriptor, ServiceKind};
pub use template::{GlobalEnv, RenderContext};
