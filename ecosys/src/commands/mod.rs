pub mod check;
pub mod render;
pub mod resolve;

use anyhow::{Context, Result};
use ecosys_core::config::ResolverSettings;
use ecosys_launch::{load_spec, validate, LaunchSpec, LaunchSpecError};
use ecosys_resolver::{InterpreterResolver, ResolverConfig};
use std::path::Path;

use crate::cli::ResolverArgs;

/// Resolver from env settings with CLI overrides applied.
pub(crate) fn build_resolver(args: &ResolverArgs) -> Result<InterpreterResolver> {
    let settings = ResolverSettings::from_env().with_cli_overrides(
        args.manager.clone(),
        args.timeout_ms,
        args.interpreter.clone(),
        args.fallback.clone(),
        args.layout.clone(),
    );
    let config = ResolverConfig::from_settings(&settings).context("Invalid resolver settings")?;
    let resolver = InterpreterResolver::new(config);
    let config = resolver.config();
    tracing::debug!(
        manager = %config.manager_program,
        layout = %config.layout,
        timeout_ms = config.manager_timeout.as_millis() as u64,
        "Resolver configured"
    );
    Ok(resolver)
}

/// Load and validate a spec; every validation problem is reported together.
pub(crate) fn load_valid_spec(config: &Path) -> Result<LaunchSpec> {
    let spec = load_spec(config)?;
    validate(&spec).map_err(LaunchSpecError::Invalid)?;
    Ok(spec)
}
