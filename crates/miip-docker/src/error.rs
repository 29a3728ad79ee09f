//! Container runtime error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("SQL statement failed (exit {code:?}): {sql}\n{stderr}")]
    SqlFailed {
        sql: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("no running container for compose service '{0}'")]
    ContainerNotRunning(String),

    #[error(transparent)]
    Core(#[from] miip_core::CoreError),
}

pub type Result<T> = std::result::Result<T, DockerError>;
