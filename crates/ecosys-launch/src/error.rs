use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors loading or validating a launch spec.
#[derive(Debug, Error)]
pub enum LaunchSpecError {
    #[error("Failed to read launch spec {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Launch spec has {} problem(s):\n{}", .0.len(), format_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

/// One validation problem, optionally tied to an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub app: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn spec(message: impl Into<String>) -> Self {
        Self {
            app: None,
            message: message.into(),
        }
    }

    pub fn app(app: &str, message: impl Into<String>) -> Self {
        Self {
            app: Some(app.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.app {
            Some(app) if !app.is_empty() => write!(f, "[{}] {}", app, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}
