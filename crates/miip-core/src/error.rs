use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {path}\nreason: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("Service not found in compose file: {0}")]
    ServiceNotFound(String),

    #[error("Unknown service token: {0} (expected archive, archive-receiver or research-platform)")]
    UnknownService(String),

    #[error("Service '{service}' is missing required environment key '{key}'")]
    MissingEnvKey { service: String, key: String },

    #[error("No 'shadow' volume mount found for service: {0}")]
    MissingShadowMount(String),

    #[error("Template error: {file}\nreason: {message}")]
    TemplateError { file: PathBuf, message: String },

    #[error("Template render error: {0}")]
    TemplateRenderError(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
