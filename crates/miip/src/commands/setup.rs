use std::path::Path;

use colored::Colorize;
use miip_core::{GlobalEnv, RenderContext, ServiceDescriptor, template};
use miip_docker::PostgresAdmin;

/// Provision the service's database objects, then render its config into the
/// location implied by the compose file.
pub async fn handle(
    descriptor: &ServiceDescriptor,
    admin: &PostgresAdmin,
    globals: &GlobalEnv,
) -> anyhow::Result<()> {
    println!("{} {}", "Setting up".bold(), descriptor.kind.as_str().cyan());

    admin.setup_service(descriptor).await?;
    println!("  {} database objects provisioned", "✓".green());

    let mut context = RenderContext::new(globals);
    context.insert_environment(&descriptor.environment);
    if let Some(data_dir) = &descriptor.data_dir {
        context.insert("DATA_DIR", data_dir);
    }

    let output_path = descriptor.output_path()?;
    template::render_to_file(
        Path::new(descriptor.kind.template_path()),
        Path::new(output_path),
        &context,
    )?;
    println!("  {} config rendered → {}", "✓".green(), output_path.cyan());

    Ok(())
}
