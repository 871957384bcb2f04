//! Environment variable keys and aliases.
//!
//! Primary names use the `ECOSYS_*` prefix; aliases are read when the primary is unset.

/// Interpreter resolution
pub mod resolver {
    /// Environment manager executable. conda exports `CONDA_EXE` inside activated shells.
    pub const ECOSYS_ENV_MANAGER: &str = "ECOSYS_ENV_MANAGER";
    pub const ENV_MANAGER_ALIASES: &[&str] = &["CONDA_EXE"];

    /// Timeout for the manager base-path query, in milliseconds.
    pub const ECOSYS_MANAGER_TIMEOUT_MS: &str = "ECOSYS_MANAGER_TIMEOUT_MS";

    /// Interpreter binary name inside an environment (default `python`).
    pub const ECOSYS_INTERPRETER: &str = "ECOSYS_INTERPRETER";

    /// Token returned when nothing else resolves (default `python`).
    pub const ECOSYS_FALLBACK: &str = "ECOSYS_FALLBACK";

    /// Relative layout template, e.g. `envs/{env}/bin/{interpreter}`.
    pub const ECOSYS_ENV_LAYOUT: &str = "ECOSYS_ENV_LAYOUT";
}

/// Observability and logging
pub mod observability {
    pub const ECOSYS_QUIET: &str = "ECOSYS_QUIET";
    pub const QUIET_ALIASES: &[&str] = &[];

    pub const ECOSYS_LOG_LEVEL: &str = "ECOSYS_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &[];

    pub const ECOSYS_LOG_JSON: &str = "ECOSYS_LOG_JSON";
    pub const LOG_JSON_ALIASES: &[&str] = &[];

    pub const ECOSYS_AUDIT_LOG: &str = "ECOSYS_AUDIT_LOG";
    pub const AUDIT_LOG_ALIASES: &[&str] = &[];
}
