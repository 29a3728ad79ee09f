use colored::Colorize;
use miip_core::ServiceDescriptor;
use miip_docker::PostgresAdmin;

/// Drop the service's database and then its user, in that order.
pub async fn handle(descriptor: &ServiceDescriptor, admin: &PostgresAdmin) -> anyhow::Result<()> {
    println!("{} {}", "Cleaning".bold(), descriptor.kind.as_str().cyan());

    admin.clean_service(descriptor).await?;
    println!("  {} database and user dropped", "✓".green());

    Ok(())
}
