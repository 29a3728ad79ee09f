//! Container runtime plumbing for the MIIP bootstrapper
//!
//! Wraps the docker-compose and docker CLIs: resolving the running postgres
//! container and running provisioning SQL inside it. Both argument shapes
//! are preserved bit-for-bit for compatibility with the deployment repo.
//!
//! # Requirements
//!
//! - `docker-compose` and `docker` must be on the PATH
//! - the postgres compose service must be running before provisioning

pub mod error;
pub mod postgres;
pub mod runtime;

pub use error::{DockerError, Result};
pub use postgres::{
    ExecMode, ExecOutcome, PostgresAdmin, Statement, clean_statements, setup_statements,
};
pub use runtime::ComposeCli;
