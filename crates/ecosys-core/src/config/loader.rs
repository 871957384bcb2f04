//! Environment variable loading.
//!
//! Fallback chains (primary → aliases → default) live here so callers never
//! repeat `or_else` ladders.

use std::env;
use std::path::Path;

/// Parse `.env` content into key/value pairs.
///
/// Blank lines and `#` comments are skipped, surrounding quotes are stripped and
/// an unquoted trailing `# comment` is dropped.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Load `<dir>/.env` into the process environment without overriding set variables.
pub fn load_dotenv_from_dir(dir: &Path) {
    let path = dir.join(".env");
    let Ok(content) = std::fs::read_to_string(&path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            set_env_var(&key, &value);
        }
    }
    tracing::debug!(path = %path.display(), "Loaded .env");
}

/// Load `.env` from the current directory (once per process).
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
        load_dotenv_from_dir(&dir);
    });
}

fn lookup(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
}

/// Read primary or aliases, falling back to `default` when unset or empty.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    lookup(primary, aliases)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default)
}

/// Read primary or aliases; empty values count as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary, aliases).and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Boolean variable: `0`/`false`/`no`/`off` are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match lookup(primary, aliases).as_deref() {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

/// Unsigned integer variable. Unparsable values log a warning and use `default`.
pub fn env_u64(primary: &str, aliases: &[&str], default: u64) -> u64 {
    match env_optional(primary, aliases) {
        Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}: {:?}, using default ({})", primary, raw, default);
            default
        }),
        None => default,
    }
}

// All env mutation goes through this helper. Call it before any threads are
// spawned.

pub fn set_env_var(key: &str, value: &str) {
    env::set_var(key, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remove_env_var(key: &str) {
        env::remove_var(key);
    }

    #[test]
    fn test_parse_dotenv_quotes_and_comments() {
        let pairs = parse_dotenv(
            "# comment\n\nECOSYS_A=plain\nECOSYS_B=\"quoted value\"\nECOSYS_C='single' \nECOSYS_D=x # trailing\nexport ECOSYS_E=1\nnot a pair\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("ECOSYS_A".to_string(), "plain".to_string()),
                ("ECOSYS_B".to_string(), "quoted value".to_string()),
                ("ECOSYS_C".to_string(), "single".to_string()),
                ("ECOSYS_D".to_string(), "x".to_string()),
                ("ECOSYS_E".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_dotenv_keeps_hash_inside_quotes() {
        let pairs = parse_dotenv("URL=\"http://host/#frag\"\n");
        assert_eq!(pairs[0].1, "http://host/#frag");
    }

    #[test]
    fn test_env_or_uses_alias_then_default() {
        set_env_var("ECOSYS_TEST_ALIAS_ONLY", "from-alias");
        let v = env_or("ECOSYS_TEST_PRIMARY_UNSET", &["ECOSYS_TEST_ALIAS_ONLY"], || {
            "default".to_string()
        });
        assert_eq!(v, "from-alias");
        let d = env_or("ECOSYS_TEST_PRIMARY_UNSET_2", &[], || "default".to_string());
        assert_eq!(d, "default");
        remove_env_var("ECOSYS_TEST_ALIAS_ONLY");
    }

    #[test]
    fn test_env_optional_treats_blank_as_unset() {
        set_env_var("ECOSYS_TEST_BLANK", "   ");
        assert_eq!(env_optional("ECOSYS_TEST_BLANK", &[]), None);
        remove_env_var("ECOSYS_TEST_BLANK");
    }

    #[test]
    fn test_env_bool_and_u64() {
        set_env_var("ECOSYS_TEST_BOOL_OFF", "off");
        set_env_var("ECOSYS_TEST_U64_BAD", "soon");
        set_env_var("ECOSYS_TEST_U64_OK", "250");
        assert!(!env_bool("ECOSYS_TEST_BOOL_OFF", &[], true));
        assert!(env_bool("ECOSYS_TEST_BOOL_UNSET", &[], true));
        assert_eq!(env_u64("ECOSYS_TEST_U64_BAD", &[], 7), 7);
        assert_eq!(env_u64("ECOSYS_TEST_U64_OK", &[], 7), 250);
        remove_env_var("ECOSYS_TEST_BOOL_OFF");
        remove_env_var("ECOSYS_TEST_U64_BAD");
        remove_env_var("ECOSYS_TEST_U64_OK");
    }

    #[test]
    fn test_load_dotenv_from_dir_does_not_override() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join(".env"),
            "ECOSYS_TEST_DOTENV_NEW=fresh\nECOSYS_TEST_DOTENV_SET=file\n",
        )
        .unwrap();
        set_env_var("ECOSYS_TEST_DOTENV_SET", "process");
        load_dotenv_from_dir(tmp.path());
        assert_eq!(env::var("ECOSYS_TEST_DOTENV_NEW").unwrap(), "fresh");
        assert_eq!(env::var("ECOSYS_TEST_DOTENV_SET").unwrap(), "process");
        remove_env_var("ECOSYS_TEST_DOTENV_NEW");
        remove_env_var("ECOSYS_TEST_DOTENV_SET");
    }
}
