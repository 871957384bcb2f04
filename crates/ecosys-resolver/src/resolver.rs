//! Interpreter resolver: manager env → search path → fallback token.
//!
//! Every failed tier is logged and the next one is tried. Nothing is ever
//! returned as an error; the worst case is the fallback token.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ecosys_core::config::schema::DEFAULT_FALLBACK;
use ecosys_core::config::ResolverSettings;
use ecosys_core::observability;
use serde::Serialize;

use crate::command::{CommandRunner, SystemCommandRunner};
use crate::diag;
use crate::layout::{is_plain_component, EnvLayout, LayoutError};

/// Which tier produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Manager,
    SearchPath,
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Manager => "manager",
            Source::SearchPath => "search_path",
            Source::Fallback => "fallback",
        })
    }
}

/// A lookup tier tried before the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `<manager base>/<layout>` must exist and be executable.
    ManagerEnv,
    /// An executable named exactly like the env, found on the search path.
    SearchPath,
}

impl Strategy {
    /// Tiers in the order they are tried.
    pub const CHAIN: &'static [Strategy] = &[Strategy::ManagerEnv, Strategy::SearchPath];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::ManagerEnv => "manager_env",
            Strategy::SearchPath => "search_path",
        }
    }

    fn source(&self) -> Source {
        match self {
            Strategy::ManagerEnv => Source::Manager,
            Strategy::SearchPath => Source::SearchPath,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub env_name: String,
    pub path: String,
    pub source: Source,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Environment manager executable (e.g. `conda`, `micromamba`)
    pub manager_program: String,
    /// Arguments that make the manager print its base directory
    pub manager_args: Vec<String>,
    pub manager_timeout: Duration,
    pub layout: EnvLayout,
    /// Interpreter binary name inside an env
    pub interpreter: String,
    /// Token returned when no tier resolves
    pub fallback: String,
    /// Overrides `PATH` for the search-path tier; `None` uses the process `PATH`
    pub search_path: Option<OsString>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let settings = ResolverSettings::default();
        Self {
            manager_program: settings.manager,
            manager_args: vec!["info".to_string(), "--base".to_string()],
            manager_timeout: Duration::from_millis(settings.manager_timeout_ms),
            layout: EnvLayout::platform_default(),
            interpreter: settings.interpreter,
            fallback: settings.fallback,
            search_path: None,
        }
    }
}

impl ResolverConfig {
    pub fn from_settings(settings: &ResolverSettings) -> Result<Self, LayoutError> {
        let layout = match settings.layout.as_deref() {
            Some(template) => EnvLayout::parse(template)?,
            None => EnvLayout::platform_default(),
        };
        Ok(Self {
            manager_program: settings.manager.clone(),
            manager_timeout: Duration::from_millis(settings.manager_timeout_ms),
            layout,
            interpreter: settings.interpreter.clone(),
            fallback: settings.fallback.clone(),
            ..Self::default()
        })
    }
}

pub struct InterpreterResolver<R: CommandRunner = SystemCommandRunner> {
    runner: R,
    config: ResolverConfig,
}

impl InterpreterResolver<SystemCommandRunner> {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_runner(SystemCommandRunner, config)
    }

    /// Resolver configured from ECOSYS_* env vars.
    pub fn from_env() -> Result<Self, LayoutError> {
        Ok(Self::new(ResolverConfig::from_settings(
            &ResolverSettings::from_env(),
        )?))
    }
}

impl<R: CommandRunner> InterpreterResolver<R> {
    pub fn with_runner(runner: R, config: ResolverConfig) -> Self {
        Self { runner, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the interpreter for `env_name`. Always returns a non-empty string.
    pub fn resolve(&self, env_name: &str) -> String {
        self.resolve_detailed(env_name).path
    }

    pub fn resolve_detailed(&self, env_name: &str) -> Resolution {
        let start = Instant::now();
        let env_name = env_name.trim();

        let hit = if env_name.is_empty() {
            diag!("Empty environment name, skipping lookups");
            None
        } else {
            Strategy::CHAIN.iter().find_map(|strategy| {
                let found = self.attempt(*strategy, env_name);
                observability::audit_resolution_step(
                    env_name,
                    strategy.as_str(),
                    found.is_some(),
                    &found
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                );
                found.map(|p| (p, strategy.source()))
            })
        };

        let (path, source) = match hit {
            Some((path, source)) => (path.to_string_lossy().into_owned(), source),
            None => {
                let fallback = self.fallback_token();
                tracing::warn!("Falling back to '{}' for env '{}'", fallback, env_name);
                (fallback.to_string(), Source::Fallback)
            }
        };

        observability::audit_resolution_completed(
            env_name,
            &path,
            &source.to_string(),
            start.elapsed().as_millis() as u64,
        );
        tracing::debug!(env = env_name, path = %path, source = %source, "Interpreter resolved");

        Resolution {
            env_name: env_name.to_string(),
            path,
            source,
        }
    }

    fn attempt(&self, strategy: Strategy, env_name: &str) -> Option<PathBuf> {
        match strategy {
            Strategy::ManagerEnv => self.try_manager_env(env_name),
            Strategy::SearchPath => self.try_search_path(env_name),
        }
    }

    fn fallback_token(&self) -> &str {
        let fallback = self.config.fallback.trim();
        if fallback.is_empty() {
            DEFAULT_FALLBACK
        } else {
            fallback
        }
    }

    /// Ask the manager for its base directory.
    fn manager_base(&self) -> Option<PathBuf> {
        let cfg = &self.config;
        let outcome = self
            .runner
            .run(&cfg.manager_program, &cfg.manager_args, cfg.manager_timeout);
        let base = outcome.success_stdout().and_then(|stdout| {
            stdout
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .last()
                .map(PathBuf::from)
        });
        if base.is_none() {
            diag!(
                "Environment manager '{}' not available or failed to report its base path: {}",
                cfg.manager_program,
                if outcome.success_stdout().is_some() {
                    "empty output".to_string()
                } else {
                    outcome.describe()
                }
            );
        }
        base
    }

    fn try_manager_env(&self, env_name: &str) -> Option<PathBuf> {
        let base = self.manager_base()?;
        let Some(candidate) =
            self.config
                .layout
                .candidate(&base, env_name, &self.config.interpreter)
        else {
            diag!("'{}' is not a valid environment name for the manager layout", env_name);
            return None;
        };
        if is_executable(&candidate) {
            Some(candidate)
        } else {
            diag!(
                "Interpreter not found or not executable: {}",
                candidate.display()
            );
            None
        }
    }

    fn try_search_path(&self, env_name: &str) -> Option<PathBuf> {
        if !is_plain_component(env_name) {
            diag!("'{}' is not a bare command name, skipping search path", env_name);
            return None;
        }
        let found = match &self.config.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(env_name, Some(paths), cwd)
            }
            None => which::which(env_name),
        };
        match found {
            Ok(path) => {
                diag!("Using {} from search path: {}", env_name, path.display());
                Some(path)
            }
            Err(_) => {
                diag!("Interpreter for {} not found in search path", env_name);
                None
            }
        }
    }
}

/// Regular file with at least one execute bit (Unix); any regular file elsewhere.
pub fn is_executable(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if !meta.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
