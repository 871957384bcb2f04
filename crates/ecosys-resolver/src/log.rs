//! Quiet-mode aware diagnostics. When ECOSYS_QUIET=1, step diagnostics are suppressed.
//! Uses `tracing::info!` so output is captured by the tracing subscriber.

#[macro_export]
macro_rules! diag {
    ($($arg:tt)*) => {{
        if !$crate::log::is_quiet() {
            tracing::info!($($arg)*);
        }
    }};
}

pub fn is_quiet() -> bool {
    ecosys_core::config::ObservabilityConfig::from_env().quiet
}
