//! Observability: tracing init and the JSONL audit log.
//!
//! Reads `ObservabilityConfig` for ECOSYS_QUIET, ECOSYS_LOG_LEVEL, ECOSYS_LOG_JSON
//! and ECOSYS_AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Tracing initialization mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TracingMode {
    /// Use ECOSYS_LOG_LEVEL / ECOSYS_QUIET from env
    Default,
    /// `--verbose`: debug for all ecosys crates, unless quiet
    Verbose,
}

/// Build the filter directive for a mode. Quiet always wins.
pub fn filter_directive(mode: TracingMode, quiet: bool, log_level: &str) -> String {
    if quiet {
        return "ecosys=warn".to_string();
    }
    match mode {
        TracingMode::Default => log_level.to_string(),
        TracingMode::Verbose => format!("{},ecosys=debug", log_level),
    }
}

/// Initialize tracing. Call once at process startup.
///
/// Logs go to stderr; stdout is reserved for command output.
pub fn init_tracing(mode: TracingMode) {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level = filter_directive(mode, cfg.quiet, &cfg.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<&'static str> {
    static AUDIT_PATH: OnceLock<Option<String>> = OnceLock::new();
    AUDIT_PATH
        .get_or_init(|| {
            let path = crate::config::ObservabilityConfig::from_env().audit_log.clone()?;
            if let Some(parent) = Path::new(&path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            Some(path)
        })
        .as_deref()
}

/// Append one JSON record as a line. Write errors are ignored.
pub fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn emit(record: serde_json::Value) {
    if let Some(path) = get_audit_path() {
        append_jsonl(Path::new(path), &record);
    }
}

/// Audit: one resolution tier was tried.
pub fn audit_resolution_step(env_name: &str, strategy: &str, hit: bool, detail: &str) {
    emit(json!({
        "ts": now(),
        "event": "resolution_step",
        "env_name": env_name,
        "strategy": strategy,
        "hit": hit,
        "detail": detail,
    }));
}

/// Audit: resolution finished.
pub fn audit_resolution_completed(env_name: &str, path: &str, source: &str, duration_ms: u64) {
    emit(json!({
        "ts": now(),
        "event": "resolution_completed",
        "env_name": env_name,
        "path": path,
        "source": source,
        "duration_ms": duration_ms,
    }));
}

/// Audit: a launch spec was rendered.
pub fn audit_render_completed(config: &str, apps: usize, resolved_envs: usize, output: &str) {
    emit(json!({
        "ts": now(),
        "event": "render_completed",
        "config": config,
        "apps": apps,
        "resolved_envs": resolved_envs,
        "output": output,
    }));
}
