//! `ecosys render <CONFIG>`: validate, resolve interpreters, emit pm2 JSON.

use anyhow::{Context, Result};
use ecosys_core::observability;
use ecosys_launch::render;
use std::fs;
use std::path::Path;

use crate::cli::ResolverArgs;

pub fn cmd_render(config: &str, output: Option<&str>, args: &ResolverArgs) -> Result<()> {
    let spec = super::load_valid_spec(Path::new(config))?;
    let resolver = super::build_resolver(args)?;

    let rendered = render(&spec, &resolver);
    for r in &rendered.resolutions {
        tracing::info!("{} -> {} ({})", r.env_name, r.path, r.source);
    }

    let mut json = rendered
        .ecosystem
        .to_json_pretty()
        .context("Failed to serialize ecosystem")?;
    json.push('\n');

    match output {
        Some(out) => {
            let out_path = Path::new(out);
            if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(out_path, &json)
                .with_context(|| format!("Failed to write {}", out_path.display()))?;
            tracing::info!(
                "Wrote {} app(s) to {}",
                rendered.ecosystem.apps.len(),
                out_path.display()
            );
        }
        None => print!("{}", json),
    }

    observability::audit_render_completed(
        config,
        rendered.ecosystem.apps.len(),
        rendered.resolutions.len(),
        output.unwrap_or("-"),
    );
    Ok(())
}
