//! Declaration model for a launch spec.
//!
//! ```yaml
//! apps:
//!   - name: ai-service1
//!     cwd: ai-engine
//!     script: { interpreter_env: cnfd }
//!     args: app.py
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Environment variables for one app. Ordered for stable output.
pub type EnvMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchSpec {
    pub apps: Vec<AppDecl>,
}

/// One app. Deserialized by hand; `#[serde(flatten)]` cannot buffer 128-bit integers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppDecl {
    pub name: String,

    /// Working directory, relative to wherever the supervisor is started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    pub script: ScriptDecl,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,

    pub watch: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<EnvMap>,

    /// Variables applied by `pm2 start --env production`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_production: Option<EnvMap>,

    /// Other supervisor options (instances, max_memory_restart, ...), passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for AppDecl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AppDeclVisitor)
    }
}

struct AppDeclVisitor;

impl<'de> Visitor<'de> for AppDeclVisitor {
    type Value = AppDecl;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an app declaration")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AppDecl, A::Error> {
        let mut name: Option<String> = None;
        let mut script: Option<ScriptDecl> = None;
        let mut cwd: Option<String> = None;
        let mut args: Option<String> = None;
        let mut watch: Option<bool> = None;
        let mut env: Option<EnvMap> = None;
        let mut env_production: Option<EnvMap> = None;
        let mut extra: BTreeMap<String, serde_json::Value> = BTreeMap::new();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "name" => name = Some(map.next_value()?),
                "script" => script = Some(map.next_value()?),
                "cwd" => cwd = map.next_value()?,
                "args" => args = map.next_value()?,
                "watch" => watch = map.next_value()?,
                "env" => env = map.next_value::<Option<OptionalEnvMap>>()?.map(|m| m.0),
                "env_production" => {
                    env_production = map.next_value::<Option<OptionalEnvMap>>()?.map(|m| m.0)
                }
                _ => {
                    extra.insert(key, map.next_value()?);
                }
            }
        }

        Ok(AppDecl {
            name: name.ok_or_else(|| de::Error::missing_field("name"))?,
            cwd,
            script: script.ok_or_else(|| de::Error::missing_field("script"))?,
            args,
            watch: watch.unwrap_or(false),
            env,
            env_production,
            extra,
        })
    }
}

/// What to launch: a literal command, or the interpreter of a named environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptDecl {
    Command(String),
    Interpreter { interpreter_env: String },
}

impl ScriptDecl {
    pub fn interpreter_env(&self) -> Option<&str> {
        match self {
            ScriptDecl::Interpreter { interpreter_env } => Some(interpreter_env),
            ScriptDecl::Command(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ScriptDecl::Command(_) => "command",
            ScriptDecl::Interpreter { .. } => "interpreter",
        }
    }
}

impl AppDecl {
    /// Total declared env vars across `env` and `env_production`.
    pub fn env_var_count(&self) -> usize {
        self.env.as_ref().map_or(0, |m| m.len())
            + self.env_production.as_ref().map_or(0, |m| m.len())
    }
}

/// One env value as written. Strings, integers and booleans keep their text;
/// anything whose text a parser could alter is rejected.
enum EnvScalar {
    Value(String),
    Rejected(&'static str),
}

impl<'de> Deserialize<'de> for EnvScalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EnvScalarVisitor)
    }
}

struct EnvScalarVisitor;

impl<'de> Visitor<'de> for EnvScalarVisitor {
    type Value = EnvScalar;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, integer or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Value(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Value(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Value(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Value(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Value(v.to_string()))
    }

    fn visit_i128<E: de::Error>(self, _: i128) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Rejected("integer out of range"))
    }

    fn visit_u128<E: de::Error>(self, _: u128) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Rejected("integer out of range"))
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Rejected("floating-point values lose their original text"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Rejected("empty value"))
    }

    fn visit_none<E: de::Error>(self) -> Result<EnvScalar, E> {
        Ok(EnvScalar::Rejected("empty value"))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<EnvScalar, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(EnvScalar::Rejected("lists are not env values"))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<EnvScalar, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(EnvScalar::Rejected("maps are not env values"))
    }
}

struct EnvMapVisitor;

impl<'de> Visitor<'de> for EnvMapVisitor {
    type Value = EnvMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of environment variables")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<EnvMap, A::Error> {
        let mut env = EnvMap::new();
        while let Some(key) = map.next_key::<String>()? {
            match map.next_value::<EnvScalar>()? {
                EnvScalar::Value(v) => {
                    env.insert(key, v);
                }
                EnvScalar::Rejected(why) => {
                    return Err(de::Error::custom(format!(
                        "env var '{}': {}; quote this value",
                        key, why
                    )));
                }
            }
        }
        Ok(env)
    }
}

struct OptionalEnvMap(EnvMap);

impl<'de> Deserialize<'de> for OptionalEnvMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EnvMapVisitor).map(OptionalEnvMap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_forms() {
        let yaml = "
apps:
  - name: backend
    script: src/index.js
  - name: ai
    script:
      interpreter_env: cnfd
";
        let spec: LaunchSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            spec.apps[0].script,
            ScriptDecl::Command("src/index.js".into())
        );
        assert_eq!(spec.apps[1].script.interpreter_env(), Some("cnfd"));
        assert_eq!(spec.apps[1].script.kind(), "interpreter");
        assert!(!spec.apps[0].watch);
    }

    #[test]
    fn test_env_scalars_become_strings() {
        let yaml = "
apps:
  - name: backend
    script: index.js
    env:
      PORT: 4000
      OFFSET: -3
      VERSION: '1.10'
      DEBUG: false
      URL: http://localhost
";
        let spec: LaunchSpec = serde_yaml::from_str(yaml).unwrap();
        let env = spec.apps[0].env.as_ref().unwrap();
        assert_eq!(env["PORT"], "4000");
        assert_eq!(env["OFFSET"], "-3");
        assert_eq!(env["VERSION"], "1.10");
        assert_eq!(env["DEBUG"], "false");
        assert_eq!(env["URL"], "http://localhost");
        assert_eq!(spec.apps[0].env_var_count(), 5);
    }

    fn env_error(value: &str) -> String {
        let yaml = format!(
            "apps:\n  - name: api\n    script: app.js\n    env:\n      PORT: 80\n      VALUE:{}\n",
            value
        );
        serde_yaml::from_str::<LaunchSpec>(&yaml)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_unquoted_float_is_rejected_with_key() {
        let err = env_error(" 1.10");
        assert!(err.contains("env var 'VALUE'"), "{}", err);
        assert!(err.contains("quote this value"), "{}", err);
    }

    #[test]
    fn test_huge_integer_is_rejected_with_key() {
        let err = env_error(" 12345678901234567890123");
        assert!(err.contains("env var 'VALUE'"), "{}", err);
        assert!(err.contains("out of range"), "{}", err);
    }

    #[test]
    fn test_empty_value_is_rejected_with_key() {
        let err = env_error("");
        assert!(err.contains("env var 'VALUE'"), "{}", err);
        assert!(err.contains("empty value"), "{}", err);
    }

    #[test]
    fn test_json_env_values() {
        let json = r#"{"apps":[{"name":"api","script":"app.js","env":{"PORT":4000,"ON":true,"NAME":"x"}}]}"#;
        let spec: LaunchSpec = serde_json::from_str(json).unwrap();
        let env = spec.apps[0].env.as_ref().unwrap();
        assert_eq!(env["PORT"], "4000");
        assert_eq!(env["ON"], "true");

        let bad = r#"{"apps":[{"name":"api","script":"app.js","env":{"RATIO":0.5}}]}"#;
        let err = serde_json::from_str::<LaunchSpec>(bad).unwrap_err().to_string();
        assert!(err.contains("env var 'RATIO'"), "{}", err);
    }

    #[test]
    fn test_null_env_map_is_absent() {
        let yaml = "apps:\n  - name: api\n    script: app.js\n    env:\n";
        let spec: LaunchSpec = serde_yaml::from_str(yaml).unwrap();
        assert!(spec.apps[0].env.is_none());
    }

    #[test]
    fn test_unknown_options_pass_through() {
        let json = r#"{"apps":[{"name":"api","script":"app.js","instances":2,"exec_mode":"cluster"}]}"#;
        let spec: LaunchSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.apps[0].extra["instances"], serde_json::json!(2));
        assert_eq!(spec.apps[0].extra["exec_mode"], serde_json::json!("cluster"));
    }

    #[test]
    fn test_missing_script_is_an_error() {
        let yaml = "apps:\n  - name: nothing\n";
        assert!(serde_yaml::from_str::<LaunchSpec>(yaml).is_err());
    }
}
