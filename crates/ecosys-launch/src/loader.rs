//! Read a launch spec from disk. `.json` is parsed as JSON; everything else as YAML.

use std::path::Path;

use crate::app::LaunchSpec;
use crate::error::LaunchSpecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Yaml,
    Json,
}

impl SpecFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => SpecFormat::Json,
            _ => SpecFormat::Yaml,
        }
    }
}

pub fn load_spec(path: &Path) -> Result<LaunchSpec, LaunchSpecError> {
    let content = std::fs::read_to_string(path).map_err(|source| LaunchSpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = parse_spec(&content, SpecFormat::from_path(path), path)?;
    tracing::debug!(path = %path.display(), apps = spec.apps.len(), "Loaded launch spec");
    Ok(spec)
}

/// Parse spec content. `origin` is only used in error messages.
pub fn parse_spec(
    content: &str,
    format: SpecFormat,
    origin: &Path,
) -> Result<LaunchSpec, LaunchSpecError> {
    match format {
        SpecFormat::Yaml => serde_yaml::from_str(content).map_err(|source| LaunchSpecError::Yaml {
            path: origin.to_path_buf(),
            source,
        }),
        SpecFormat::Json => serde_json::from_str(content).map_err(|source| LaunchSpecError::Json {
            path: origin.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SpecFormat::from_path(Path::new("eco.JSON")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_path(Path::new("eco.yml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("ecosystem")), SpecFormat::Yaml);
    }

    #[test]
    fn test_load_yaml_and_json() {
        let tmp = tempfile::tempdir().unwrap();
        let yaml = tmp.path().join("apps.yaml");
        fs::write(&yaml, "apps:\n  - name: web\n    script: npx\n    args: serve -s dist\n").unwrap();
        let json = tmp.path().join("apps.json");
        fs::write(&json, r#"{"apps":[{"name":"web","script":"npx","args":"serve -s dist"}]}"#).unwrap();

        let a = load_spec(&yaml).unwrap();
        let b = load_spec(&json).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.apps[0].args.as_deref(), Some("serve -s dist"));
    }

    #[test]
    fn test_errors_name_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.yaml");
        let err = load_spec(&missing).unwrap_err();
        assert!(matches!(err, LaunchSpecError::Io { .. }));
        assert!(err.to_string().contains("missing.yaml"));

        let bad = tmp.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        let err = load_spec(&bad).unwrap_err();
        assert!(matches!(err, LaunchSpecError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }
}
