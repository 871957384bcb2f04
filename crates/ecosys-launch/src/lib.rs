//! Launch specs: the declared apps a process supervisor should run.
//!
//! - `app`: declaration model (YAML / JSON)
//! - `loader`: read a declaration file
//! - `validate`: structural checks
//! - `render`: resolve interpreter references and emit a pm2 ecosystem file

pub mod app;
pub mod error;
pub mod loader;
pub mod render;
pub mod validate;

pub use app::{AppDecl, EnvMap, LaunchSpec, ScriptDecl};
pub use error::{LaunchSpecError, ValidationIssue};
pub use loader::{load_spec, parse_spec, SpecFormat};
pub use render::{render, RenderedApp, RenderedEcosystem, Rendered};
pub use validate::{missing_cwds, validate};
