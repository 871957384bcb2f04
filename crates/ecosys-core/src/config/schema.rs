//! Typed config structs, built from environment variables.

use super::env_keys::observability as obv_keys;
use super::env_keys::resolver as res_keys;
use super::loader::{env_bool, env_optional, env_or, env_u64};

/// Default environment manager executable.
pub const DEFAULT_ENV_MANAGER: &str = "conda";
/// Default timeout for the manager base-path query.
pub const DEFAULT_MANAGER_TIMEOUT_MS: u64 = 5_000;
/// Default interpreter binary name inside an environment.
pub const DEFAULT_INTERPRETER: &str = "python";
/// Default fallback token.
pub const DEFAULT_FALLBACK: &str = "python";

/// Interpreter resolution settings from env.
///
/// `layout` stays `None` unless overridden so the resolver can pick the
/// platform default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    pub manager: String,
    pub manager_timeout_ms: u64,
    pub interpreter: String,
    pub fallback: String,
    pub layout: Option<String>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            manager: DEFAULT_ENV_MANAGER.to_string(),
            manager_timeout_ms: DEFAULT_MANAGER_TIMEOUT_MS,
            interpreter: DEFAULT_INTERPRETER.to_string(),
            fallback: DEFAULT_FALLBACK.to_string(),
            layout: None,
        }
    }
}

impl ResolverSettings {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            manager: env_or(
                res_keys::ECOSYS_ENV_MANAGER,
                res_keys::ENV_MANAGER_ALIASES,
                || DEFAULT_ENV_MANAGER.to_string(),
            ),
            manager_timeout_ms: env_u64(
                res_keys::ECOSYS_MANAGER_TIMEOUT_MS,
                &[],
                DEFAULT_MANAGER_TIMEOUT_MS,
            ),
            interpreter: env_or(res_keys::ECOSYS_INTERPRETER, &[], || {
                DEFAULT_INTERPRETER.to_string()
            }),
            fallback: env_or(res_keys::ECOSYS_FALLBACK, &[], || {
                DEFAULT_FALLBACK.to_string()
            }),
            layout: env_optional(res_keys::ECOSYS_ENV_LAYOUT, &[]),
        }
    }

    /// Apply CLI overrides (CLI > env > default).
    pub fn with_cli_overrides(
        mut self,
        manager: Option<String>,
        timeout_ms: Option<u64>,
        interpreter: Option<String>,
        fallback: Option<String>,
        layout: Option<String>,
    ) -> Self {
        if let Some(m) = manager {
            self.manager = m;
        }
        if let Some(t) = timeout_ms {
            self.manager_timeout_ms = t;
        }
        if let Some(i) = interpreter {
            self.interpreter = i;
        }
        if let Some(f) = fallback {
            self.fallback = f;
        }
        if layout.is_some() {
            self.layout = layout;
        }
        self
    }
}

/// Observability: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::ECOSYS_QUIET, obv_keys::QUIET_ALIASES, false),
                log_level: env_or(obv_keys::ECOSYS_LOG_LEVEL, obv_keys::LOG_LEVEL_ALIASES, || {
                    "ecosys=info".to_string()
                }),
                log_json: env_bool(obv_keys::ECOSYS_LOG_JSON, obv_keys::LOG_JSON_ALIASES, false),
                audit_log: env_optional(obv_keys::ECOSYS_AUDIT_LOG, obv_keys::AUDIT_LOG_ALIASES),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_win() {
        let s = ResolverSettings::default().with_cli_overrides(
            Some("micromamba".into()),
            Some(250),
            None,
            Some("python3".into()),
            Some("envs/{env}/bin/{interpreter}".into()),
        );
        assert_eq!(s.manager, "micromamba");
        assert_eq!(s.manager_timeout_ms, 250);
        assert_eq!(s.interpreter, DEFAULT_INTERPRETER);
        assert_eq!(s.fallback, "python3");
        assert_eq!(s.layout.as_deref(), Some("envs/{env}/bin/{interpreter}"));
    }

    #[test]
    fn test_no_layout_override_keeps_existing() {
        let mut base = ResolverSettings::default();
        base.layout = Some("custom/{env}".into());
        let s = base.with_cli_overrides(None, None, None, None, None);
        assert_eq!(s.layout.as_deref(), Some("custom/{env}"));
    }

    #[test]
    fn test_from_env_reads_keys_and_manager_alias() {
        use crate::config::set_env_var;
        use std::env;

        // Only this test touches the resolver keys.
        set_env_var("CONDA_EXE", "/opt/conda/bin/conda");
        set_env_var("ECOSYS_MANAGER_TIMEOUT_MS", "750");
        set_env_var("ECOSYS_INTERPRETER", "python3.11");
        set_env_var("ECOSYS_FALLBACK", "python3");
        set_env_var("ECOSYS_ENV_LAYOUT", "custom/{env}/{interpreter}");
        env::remove_var("ECOSYS_ENV_MANAGER");

        let s = ResolverSettings::from_env();
        assert_eq!(s.manager, "/opt/conda/bin/conda");
        assert_eq!(s.manager_timeout_ms, 750);
        assert_eq!(s.interpreter, "python3.11");
        assert_eq!(s.fallback, "python3");
        assert_eq!(s.layout.as_deref(), Some("custom/{env}/{interpreter}"));

        set_env_var("ECOSYS_ENV_MANAGER", "micromamba");
        assert_eq!(ResolverSettings::from_env().manager, "micromamba");

        let s = ResolverSettings::from_env().with_cli_overrides(
            Some("mamba".into()),
            None,
            None,
            None,
            None,
        );
        assert_eq!(s.manager, "mamba");
        assert_eq!(s.fallback, "python3");

        for key in [
            "CONDA_EXE",
            "ECOSYS_ENV_MANAGER",
            "ECOSYS_MANAGER_TIMEOUT_MS",
            "ECOSYS_INTERPRETER",
            "ECOSYS_FALLBACK",
            "ECOSYS_ENV_LAYOUT",
        ] {
            env::remove_var(key);
        }
    }
}
