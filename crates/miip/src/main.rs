mod commands;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use miip_core::{ComposeFile, GlobalEnv, ServiceDescriptor, ServiceKind};
use miip_docker::{ComposeCli, ExecMode, PostgresAdmin};

/// Compose service alias of the database container.
const POSTGRES_ALIAS: &str = "postgres";

#[derive(Parser)]
#[command(name = "miip")]
#[command(version)]
#[command(about = "Cleans and sets up config and database state for docker-compose defined MIIP services", long_about = None)]
struct Cli {
    /// Drop each selected service's database and user instead of setting up
    #[arg(long)]
    clean: bool,

    /// Ignore failed psql statements instead of aborting (legacy behavior)
    #[arg(long)]
    permissive: bool,

    /// Services to bootstrap (archive, archive-receiver, research-platform)
    #[arg(required = true, value_parser = parse_service)]
    services: Vec<ServiceKind>,
}

fn parse_service(token: &str) -> Result<ServiceKind, miip_core::CoreError> {
    token.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::debug!("MIIP Bootstrapper v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    // Fatal before any side effect: the compose file must load cleanly.
    let compose = ComposeFile::load(Path::new(miip_core::COMPOSE_FILE))?;

    let runtime = ComposeCli::new();
    let container_id = runtime.require_container_id(POSTGRES_ALIAS).await?;
    println!(
        "{} {} → {}",
        "Database container:".bold(),
        POSTGRES_ALIAS.cyan(),
        container_id.cyan()
    );

    let mode = if cli.permissive {
        ExecMode::Permissive
    } else {
        ExecMode::Strict
    };
    let admin = PostgresAdmin::new(&container_id, mode);
    let globals = GlobalEnv::default();

    // Fixed processing order, whatever the order on the command line.
    // Duplicate tokens are processed once.
    for kind in ServiceKind::PROCESSING_ORDER {
        if !cli.services.contains(&kind) {
            continue;
        }

        let descriptor = ServiceDescriptor::from_compose(kind, &compose)?;
        if cli.clean {
            commands::clean::handle(&descriptor, &admin).await?;
        } else {
            commands::setup::handle(&descriptor, &admin, &globals).await?;
        }
    }

    Ok(())
}
