//! Config template rendering.
//!
//! Tera renders each service's config template against the merged service
//! environment and the fixed database location.

use std::collections::HashMap;
use std::path::Path;

use tera::{Context, Tera};
use tracing::info;

use crate::error::{CoreError, Result};

/// Fixed network location of the database service, merged into every render.
/// Constructed once per invocation and passed by parameter; immutable.
#[derive(Debug, Clone)]
pub struct GlobalEnv {
    pub db_host: String,
    pub db_port: u16,
}

impl Default for GlobalEnv {
    fn default() -> Self {
        Self {
            db_host: "postgres".to_string(),
            db_port: 5432,
        }
    }
}

/// Variable context for one render.
#[derive(Debug, Clone)]
pub struct RenderContext {
    context: Context,
}

impl RenderContext {
    /// Start a context carrying the global database location.
    pub fn new(globals: &GlobalEnv) -> Self {
        let mut context = Context::new();
        context.insert("DB_HOST", &globals.db_host);
        context.insert("DB_PORT", &globals.db_port);
        Self { context }
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.context.insert(key, value);
    }

    /// Merge a service's environment mapping at top level.
    pub fn insert_environment(&mut self, environment: &HashMap<String, String>) {
        for (key, value) in environment {
            self.context.insert(key, value);
        }
    }
}

/// Render a template string. Unresolvable variables are errors.
pub fn render_str(template: &str, ctx: &RenderContext) -> Result<String> {
    let mut tera = Tera::default();
    tera.render_str(template, &ctx.context)
        .map_err(|e| CoreError::TemplateRenderError(tera_error_detail(&e)))
}

/// Load a template file, render it, and write the result to `output_path`,
/// overwriting any existing file.
pub fn render_to_file(template_path: &Path, output_path: &Path, ctx: &RenderContext) -> Result<()> {
    let template = std::fs::read_to_string(template_path).map_err(|e| CoreError::IoError {
        path: template_path.to_path_buf(),
        message: e.to_string(),
    })?;

    let rendered = render_str(&template, ctx).map_err(|e| match e {
        CoreError::TemplateRenderError(message) => CoreError::TemplateError {
            file: template_path.to_path_buf(),
            message,
        },
        other => other,
    })?;

    std::fs::write(output_path, &rendered).map_err(|e| CoreError::IoError {
        path: output_path.to_path_buf(),
        message: e.to_string(),
    })?;

    info!(
        template = %template_path.display(),
        output = %output_path.display(),
        "Rendered config template"
    );
    Ok(())
}

/// Walk the tera error chain for something more useful than "failed to render".
fn tera_error_detail(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }
    details.join(" | ")
}
