//! Environment directory layout under a manager's base directory.
//!
//! A layout is a relative template such as `envs/{env}/bin/{interpreter}`.
//! Components are split on `/` or `\` and joined with `PathBuf`, so the same
//! template works on every platform.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ENV_PLACEHOLDER: &str = "{env}";
pub const INTERPRETER_PLACEHOLDER: &str = "{interpreter}";

/// conda layout on Unix: `<base>/envs/<name>/bin/python`
pub const UNIX_LAYOUT: &str = "envs/{env}/bin/{interpreter}";
/// conda layout on Windows: `<base>\envs\<name>\python.exe`
pub const WINDOWS_LAYOUT: &str = "envs/{env}/{interpreter}.exe";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout template is empty")]
    Empty,

    #[error("Layout template '{0}' must be relative to the manager base directory")]
    Absolute(String),

    #[error("Layout template '{0}' must contain {{env}}")]
    MissingEnvPlaceholder(String),

    #[error("Layout template '{0}' must not contain '..'")]
    ParentTraversal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLayout {
    components: Vec<String>,
}

impl EnvLayout {
    pub fn parse(template: &str) -> Result<Self, LayoutError> {
        let trimmed = template.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::Empty);
        }
        if trimmed.starts_with('/') || trimmed.starts_with('\\') || has_drive_prefix(trimmed) {
            return Err(LayoutError::Absolute(trimmed.to_string()));
        }
        if !trimmed.contains(ENV_PLACEHOLDER) {
            return Err(LayoutError::MissingEnvPlaceholder(trimmed.to_string()));
        }

        let components: Vec<String> = trimmed
            .split(['/', '\\'])
            .filter(|c| !c.is_empty() && *c != ".")
            .map(str::to_string)
            .collect();
        if components.iter().any(|c| c == "..") {
            return Err(LayoutError::ParentTraversal(trimmed.to_string()));
        }
        Ok(Self { components })
    }

    pub fn platform_default() -> Self {
        let template = if cfg!(windows) {
            WINDOWS_LAYOUT
        } else {
            UNIX_LAYOUT
        };
        Self::parse(template).unwrap_or_else(|_| Self {
            components: Vec::new(),
        })
    }

    /// Candidate interpreter path under `base`.
    ///
    /// Returns `None` when `env_name` or `interpreter` is not a single plain path
    /// component, so a name like `../x` can never escape the base directory.
    pub fn candidate(&self, base: &Path, env_name: &str, interpreter: &str) -> Option<PathBuf> {
        if !is_plain_component(env_name) || !is_plain_component(interpreter) {
            return None;
        }
        let mut path = base.to_path_buf();
        for component in &self.components {
            path.push(
                component
                    .replace(ENV_PLACEHOLDER, env_name)
                    .replace(INTERPRETER_PLACEHOLDER, interpreter),
            );
        }
        Some(path)
    }
}

impl Default for EnvLayout {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl fmt::Display for EnvLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

/// A non-empty name with no path separators that is not `.` or `..`.
pub fn is_plain_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !has_drive_prefix(name)
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
