//! Unified configuration layer.
//!
//! Every environment-variable read lives here; the rest of the workspace works
//! with structured config instead of calling `std::env::var` directly.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `env_u64` and `.env` loading
//! - `schema`: `ResolverSettings`, `ObservabilityConfig`
//! - `env_keys`: key constants (with legacy aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{
    env_bool, env_optional, env_or, env_u64, load_dotenv, load_dotenv_from_dir, parse_dotenv,
    set_env_var,
};
pub use schema::{ObservabilityConfig, ResolverSettings};
