//! Interpreter resolution for launch specs.
//!
//! `InterpreterResolver::resolve` never fails: it tries the environment manager
//! layout, then the search path, then returns the fallback token.

pub mod command;
pub mod layout;
pub mod log;
pub mod resolver;

pub use command::{CommandOutcome, CommandRunner, SystemCommandRunner};
pub use layout::{EnvLayout, LayoutError};
pub use resolver::{InterpreterResolver, Resolution, ResolverConfig, Source, Strategy};
