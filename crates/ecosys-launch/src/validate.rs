//! Structural validation of a launch spec.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::app::{EnvMap, LaunchSpec, ScriptDecl};
use crate::error::ValidationIssue;

fn env_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("env key regex is valid"))
}

/// Check a spec, collecting every problem instead of stopping at the first.
pub fn validate(spec: &LaunchSpec) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if spec.apps.is_empty() {
        issues.push(ValidationIssue::spec("No apps declared"));
    }

    let mut seen = HashSet::new();
    for (idx, app) in spec.apps.iter().enumerate() {
        let name = app.name.trim();
        if name.is_empty() {
            issues.push(ValidationIssue::spec(format!("App #{} has an empty name", idx + 1)));
        } else if !seen.insert(name) {
            issues.push(ValidationIssue::app(name, "Duplicate app name"));
        }
        let label = if name.is_empty() {
            format!("App #{}", idx + 1)
        } else {
            name.to_string()
        };
        let label = label.as_str();

        match &app.script {
            ScriptDecl::Command(cmd) if cmd.trim().is_empty() => {
                issues.push(ValidationIssue::app(label, "Empty script"));
            }
            ScriptDecl::Interpreter { interpreter_env } if interpreter_env.trim().is_empty() => {
                issues.push(ValidationIssue::app(label, "Empty interpreter_env"));
            }
            _ => {}
        }

        if let Some(cwd) = &app.cwd {
            if cwd.trim().is_empty() {
                issues.push(ValidationIssue::app(label, "Empty cwd (omit it instead)"));
            }
        }

        check_env_keys(label, "env", app.env.as_ref(), &mut issues);
        check_env_keys(label, "env_production", app.env_production.as_ref(), &mut issues);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_env_keys(app: &str, field: &str, env: Option<&EnvMap>, issues: &mut Vec<ValidationIssue>) {
    let Some(env) = env else {
        return;
    };
    for key in env.keys() {
        if !env_key_re().is_match(key) {
            issues.push(ValidationIssue::app(
                app,
                format!("Invalid variable name '{}' in {}", key, field),
            ));
        }
    }
}

/// Apps whose `cwd` does not exist relative to `base_dir`.
pub fn missing_cwds(spec: &LaunchSpec, base_dir: &Path) -> Vec<(String, PathBuf)> {
    spec.apps
        .iter()
        .filter_map(|app| {
            let cwd = app.cwd.as_deref()?.trim();
            if cwd.is_empty() {
                return None;
            }
            let path = base_dir.join(cwd);
            if path.is_dir() {
                None
            } else {
                Some((app.name.clone(), path))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(yaml: &str) -> LaunchSpec {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_spec_passes() {
        let s = spec(
            "
apps:
  - name: backend
    cwd: backend
    script: src/index.js
    env: { PORT: '4000', JWT_SECRET: x }
  - name: ai
    script: { interpreter_env: cnfd }
",
        );
        assert!(validate(&s).is_ok());
    }

    #[test]
    fn test_empty_spec() {
        let issues = validate(&LaunchSpec { apps: vec![] }).unwrap_err();
        assert_eq!(issues, vec![ValidationIssue::spec("No apps declared")]);
    }

    #[test]
    fn test_collects_all_issues() {
        let s = spec(
            "
apps:
  - name: web
    script: ''
  - name: web
    script: { interpreter_env: ' ' }
    env: { 1BAD: x, GOOD_1: y }
    env_production: { 'WITH-DASH': z }
  - name: ''
    script: ok
    cwd: ''
",
        );
        let issues = validate(&s).unwrap_err();
        let rendered: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "[web] Empty script",
                "[web] Duplicate app name",
                "[web] Empty interpreter_env",
                "[web] Invalid variable name '1BAD' in env",
                "[web] Invalid variable name 'WITH-DASH' in env_production",
                "App #3 has an empty name",
                "[App #3] Empty cwd (omit it instead)",
            ]
        );
    }

    #[test]
    fn test_missing_cwds() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("backend")).unwrap();
        let s = spec(
            "
apps:
  - name: backend
    cwd: backend
    script: a
  - name: frontend
    cwd: frontend
    script: b
  - name: anywhere
    script: c
",
        );
        let missing = missing_cwds(&s, tmp.path());
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].0, "frontend");
        assert_eq!(missing[0].1, tmp.path().join("frontend"));
    }
}
