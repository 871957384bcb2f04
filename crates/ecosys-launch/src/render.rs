//! Turn a declared spec into a pm2-compatible ecosystem document.
//!
//! Interpreter references are resolved once per distinct env name; literal
//! commands and every other field pass through unchanged.

use std::collections::{BTreeMap, HashMap};

use ecosys_resolver::{CommandRunner, InterpreterResolver, Resolution};
use serde::Serialize;

use crate::app::{AppDecl, EnvMap, LaunchSpec, ScriptDecl};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedApp {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    pub script: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    pub watch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_production: Option<EnvMap>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// The document a supervisor consumes: `{"apps": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedEcosystem {
    pub apps: Vec<RenderedApp>,
}

impl RenderedEcosystem {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Render output plus the resolutions made along the way (in first-use order).
#[derive(Debug, Clone)]
pub struct Rendered {
    pub ecosystem: RenderedEcosystem,
    pub resolutions: Vec<Resolution>,
}

pub fn render<R: CommandRunner>(spec: &LaunchSpec, resolver: &InterpreterResolver<R>) -> Rendered {
    let mut resolved: HashMap<String, usize> = HashMap::new();
    let mut resolutions: Vec<Resolution> = Vec::new();

    let apps = spec
        .apps
        .iter()
        .map(|app| {
            let script = match &app.script {
                ScriptDecl::Command(cmd) => cmd.clone(),
                ScriptDecl::Interpreter { interpreter_env } => {
                    let key = interpreter_env.trim().to_string();
                    let idx = *resolved.entry(key).or_insert_with_key(|k| {
                        resolutions.push(resolver.resolve_detailed(k));
                        resolutions.len() - 1
                    });
                    resolutions[idx].path.clone()
                }
            };
            rendered_app(app, script)
        })
        .collect();

    Rendered {
        ecosystem: RenderedEcosystem { apps },
        resolutions,
    }
}

fn rendered_app(app: &AppDecl, script: String) -> RenderedApp {
    RenderedApp {
        name: app.name.clone(),
        cwd: app.cwd.clone(),
        script,
        args: app.args.clone(),
        watch: app.watch,
        env: app.env.clone(),
        env_production: app.env_production.clone(),
        extra: app.extra.clone(),
    }
}
