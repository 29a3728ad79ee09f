//! PostgreSQL provisioning through `docker exec`.
//!
//! Each statement is one `docker exec <container-id> psql -c <sql> -U postgres`
//! invocation; no transaction spans more than one statement. The argument
//! shape is the wire contract with the database container and must not change.

use std::process::Stdio;

use miip_core::ServiceDescriptor;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{DockerError, Result};

/// How a non-zero psql exit is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Abort the run on the first failed statement.
    #[default]
    Strict,
    /// Log the failure and keep going (legacy behavior).
    Permissive,
}

/// One provisioning statement. Pure until executed, so sequences can be
/// checked without a running container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    CreateUser { user: String, password: String },
    GrantCreateDb { user: String },
    CreateDatabase { name: String, owner: String },
    DropDatabase { name: String },
    DropUser { user: String },
}

impl Statement {
    pub fn sql(&self) -> String {
        match self {
            Statement::CreateUser { user, password } => {
                format!("CREATE USER {user} WITH PASSWORD '{password}'")
            }
            Statement::GrantCreateDb { user } => format!("ALTER USER {user} WITH CREATEDB"),
            Statement::CreateDatabase { name, owner } => {
                format!("CREATE DATABASE {name} WITH OWNER {owner}")
            }
            Statement::DropDatabase { name } => format!("DROP DATABASE {name}"),
            Statement::DropUser { user } => format!("DROP USER {user}"),
        }
    }
}

/// Statements provisioning one service: a user with the CREATEDB grant for
/// every kind, a database only for services that own one.
pub fn setup_statements(descriptor: &ServiceDescriptor) -> Result<Vec<Statement>> {
    let user = descriptor.db_user()?.to_string();
    let mut statements = vec![
        Statement::CreateUser {
            user: user.clone(),
            password: descriptor.db_password()?.to_string(),
        },
        Statement::GrantCreateDb { user: user.clone() },
    ];
    if descriptor.kind.owns_database() {
        statements.push(Statement::CreateDatabase {
            name: descriptor.db_name()?.to_string(),
            owner: user,
        });
    }
    Ok(statements)
}

/// Teardown statements: the database first, then the user that owns it.
pub fn clean_statements(descriptor: &ServiceDescriptor) -> Result<Vec<Statement>> {
    Ok(vec![
        Statement::DropDatabase {
            name: descriptor.db_name()?.to_string(),
        },
        Statement::DropUser {
            user: descriptor.db_user()?.to_string(),
        },
    ])
}

/// Captured result of one psql invocation.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs provisioning SQL inside the postgres container.
pub struct PostgresAdmin {
    container_id: String,
    mode: ExecMode,
}

impl PostgresAdmin {
    pub fn new(container_id: impl Into<String>, mode: ExecMode) -> Self {
        Self {
            container_id: container_id.into(),
            mode,
        }
    }

    /// Run one statement. A spawn failure is always an error; a non-zero
    /// exit aborts in strict mode and is logged in permissive mode.
    pub async fn exec_sql(&self, sql: &str) -> Result<ExecOutcome> {
        let mut cmd = Command::new("docker");
        cmd.args(["exec", &self.container_id, "psql", "-c", sql, "-U", "postgres"]);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        debug!(container = %self.container_id, sql = %sql, "Executing SQL");

        let output = cmd.output().await.map_err(|source| DockerError::Spawn {
            command: format!("docker exec {} psql", self.container_id),
            source,
        })?;

        let outcome = ExecOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !outcome.success() {
            match self.mode {
                ExecMode::Strict => {
                    return Err(DockerError::SqlFailed {
                        sql: sql.to_string(),
                        code: outcome.code,
                        stderr: outcome.stderr,
                    });
                }
                ExecMode::Permissive => {
                    warn!(
                        sql = %sql,
                        code = ?outcome.code,
                        stderr = %outcome.stderr.trim(),
                        "Ignoring failed statement"
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// Execute a statement sequence in order.
    pub async fn apply(&self, statements: &[Statement]) -> Result<()> {
        for statement in statements {
            let sql = statement.sql();
            info!(sql = %sql, "psql");
            self.exec_sql(&sql).await?;
        }
        Ok(())
    }

    /// CREATE USER with the given credentials, then grant CREATEDB.
    pub async fn create_user(&self, user: &str, password: &str) -> Result<()> {
        self.apply(&[
            Statement::CreateUser {
                user: user.to_string(),
                password: password.to_string(),
            },
            Statement::GrantCreateDb {
                user: user.to_string(),
            },
        ])
        .await
    }

    pub async fn drop_user(&self, user: &str) -> Result<()> {
        self.apply(&[Statement::DropUser {
            user: user.to_string(),
        }])
        .await
    }

    pub async fn create_database(&self, name: &str, owner: &str) -> Result<()> {
        self.apply(&[Statement::CreateDatabase {
            name: name.to_string(),
            owner: owner.to_string(),
        }])
        .await
    }

    pub async fn drop_database(&self, name: &str) -> Result<()> {
        self.apply(&[Statement::DropDatabase {
            name: name.to_string(),
        }])
        .await
    }

    /// Provision a service's user and, when it owns one, its database.
    pub async fn setup_service(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        self.apply(&setup_statements(descriptor)?).await
    }

    /// Drop the database, then the user, in that order.
    pub async fn clean_service(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        self.apply(&clean_statements(descriptor)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miip_core::ServiceKind;
    use std::collections::HashMap;

    fn descriptor(kind: ServiceKind) -> ServiceDescriptor {
        let mut environment = HashMap::new();
        environment.insert("DB_USER".to_string(), "alice".to_string());
        environment.insert("DB_PASSWORD".to_string(), "wonderland".to_string());
        environment.insert("DB_NAME".to_string(), "imaging".to_string());
        ServiceDescriptor {
            kind,
            environment,
            data_dir: None,
            shadow_config_path: None,
        }
    }

    #[test]
    fn test_statement_sql_text() {
        assert_eq!(
            Statement::CreateUser {
                user: "alice".into(),
                password: "wonderland".into()
            }
            .sql(),
            "CREATE USER alice WITH PASSWORD 'wonderland'"
        );
        assert_eq!(
            Statement::GrantCreateDb {
                user: "alice".into()
            }
            .sql(),
            "ALTER USER alice WITH CREATEDB"
        );
        assert_eq!(
            Statement::CreateDatabase {
                name: "imaging".into(),
                owner: "alice".into()
            }
            .sql(),
            "CREATE DATABASE imaging WITH OWNER alice"
        );
        assert_eq!(
            Statement::DropDatabase {
                name: "imaging".into()
            }
            .sql(),
            "DROP DATABASE imaging"
        );
        assert_eq!(
            Statement::DropUser {
                user: "alice".into()
            }
            .sql(),
            "DROP USER alice"
        );
    }

    #[test]
    fn test_archive_setup_creates_user_then_database() {
        let statements = setup_statements(&descriptor(ServiceKind::Archive)).unwrap();

        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[0], Statement::CreateUser { .. }));
        assert!(matches!(statements[1], Statement::GrantCreateDb { .. }));
        assert!(matches!(
            statements[2],
            Statement::CreateDatabase { ref owner, .. } if owner == "alice"
        ));
    }

    #[test]
    fn test_research_platform_setup_never_creates_database() {
        let statements = setup_statements(&descriptor(ServiceKind::ResearchPlatform)).unwrap();

        assert_eq!(statements.len(), 2);
        assert!(
            statements
                .iter()
                .all(|s| !matches!(s, Statement::CreateDatabase { .. }))
        );
    }

    #[test]
    fn test_clean_drops_database_before_user() {
        for kind in ServiceKind::PROCESSING_ORDER {
            let statements = clean_statements(&descriptor(kind)).unwrap();

            assert_eq!(statements.len(), 2);
            assert!(matches!(statements[0], Statement::DropDatabase { .. }));
            assert!(matches!(statements[1], Statement::DropUser { .. }));
        }
    }

    #[test]
    fn test_setup_requires_credentials() {
        let mut descriptor = descriptor(ServiceKind::Archive);
        descriptor.environment.remove("DB_PASSWORD");

        assert!(setup_statements(&descriptor).is_err());
    }
}
