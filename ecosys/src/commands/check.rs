//! `ecosys check <CONFIG>`: validate and summarize, without resolving interpreters.

use anyhow::Result;
use ecosys_launch::{missing_cwds, LaunchSpec, ScriptDecl};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Serialize)]
struct AppSummary<'a> {
    name: &'a str,
    cwd: Option<&'a str>,
    cwd_exists: bool,
    script_kind: &'static str,
    script: &'a str,
    env_vars: usize,
    watch: bool,
}

pub fn cmd_check(config: &str, json: bool) -> Result<()> {
    let config_path = Path::new(config);
    let spec = super::load_valid_spec(config_path)?;

    let base_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let missing = missing_cwds(&spec, base_dir);
    for (name, path) in &missing {
        tracing::warn!("[{}] cwd does not exist: {}", name, path.display());
    }
    let missing_names: HashSet<&str> = missing.iter().map(|(n, _)| n.as_str()).collect();

    let summaries = summarize(&spec, &missing_names);
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{}: {} app(s) OK", config, summaries.len());
    for s in &summaries {
        println!(
            "  • {:<16} {:<12} {:<11} {} ({} env var(s){})",
            s.name,
            s.cwd.unwrap_or("."),
            s.script_kind,
            s.script,
            s.env_vars,
            if s.cwd_exists { "" } else { ", cwd missing" }
        );
    }
    Ok(())
}

fn summarize<'a>(spec: &'a LaunchSpec, missing: &HashSet<&str>) -> Vec<AppSummary<'a>> {
    spec.apps
        .iter()
        .map(|app| AppSummary {
            name: &app.name,
            cwd: app.cwd.as_deref(),
            cwd_exists: !missing.contains(app.name.as_str()),
            script_kind: app.script.kind(),
            script: match &app.script {
                ScriptDecl::Command(cmd) => cmd,
                ScriptDecl::Interpreter { interpreter_env } => interpreter_env,
            },
            env_vars: app.env_var_count(),
            watch: app.watch,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_marks_missing_cwd() {
        let spec: LaunchSpec = serde_json::from_str(
            r#"{"apps":[
                {"name":"backend","cwd":"backend","script":"src/index.js","env":{"PORT":"4000"},"env_production":{"PORT":"80"}},
                {"name":"ai","cwd":"ai-engine","script":{"interpreter_env":"cnfd"},"watch":true}
            ]}"#,
        )
        .unwrap();
        let missing: HashSet<&str> = ["ai"].into_iter().collect();
        let s = summarize(&spec, &missing);
        assert_eq!(s[0].env_vars, 2);
        assert!(s[0].cwd_exists);
        assert_eq!(s[1].script_kind, "interpreter");
        assert_eq!(s[1].script, "cnfd");
        assert!(!s[1].cwd_exists);
        assert!(s[1].watch);
    }
}
