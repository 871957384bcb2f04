use clap::{Args, Parser, Subcommand};

/// ecosys - pm2 ecosystem files with conda-aware interpreter resolution
#[derive(Parser, Debug)]
#[command(name = "ecosys")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug-level logging for ecosys crates (ignored when ECOSYS_QUIET=1)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Resolver overrides. Unset flags fall back to ECOSYS_* env vars, then defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolverArgs {
    /// Environment manager executable (default: from env or conda)
    #[arg(long, value_name = "PROGRAM")]
    pub manager: Option<String>,

    /// Timeout for the manager base-path query in milliseconds (default: from env or 5000)
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Interpreter binary name inside an environment (default: from env or python)
    #[arg(long, value_name = "NAME")]
    pub interpreter: Option<String>,

    /// Token returned when nothing resolves (default: from env or python)
    #[arg(long, value_name = "TOKEN")]
    pub fallback: Option<String>,

    /// Env layout under the manager base, e.g. "envs/{env}/bin/{interpreter}"
    #[arg(long, value_name = "TEMPLATE")]
    pub layout: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the interpreter for a named environment (always prints a path or token)
    Resolve {
        /// Environment name, e.g. cnfd
        #[arg(value_name = "ENV_NAME")]
        env_name: String,

        #[command(flatten)]
        resolver: ResolverArgs,

        /// Print {"env_name", "path", "source"} as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Validate a launch spec and write the pm2 ecosystem JSON
    Render {
        /// Launch spec (YAML or JSON)
        #[arg(value_name = "CONFIG", env = "ECOSYS_CONFIG", default_value = "ecosystem.yaml")]
        config: String,

        /// Output file (default: stdout)
        #[arg(long, short, value_name = "FILE")]
        output: Option<String>,

        #[command(flatten)]
        resolver: ResolverArgs,
    },

    /// Validate a launch spec and summarize its apps (no interpreter lookups)
    Check {
        /// Launch spec (YAML or JSON)
        #[arg(value_name = "CONFIG", env = "ECOSYS_CONFIG", default_value = "ecosystem.yaml")]
        config: String,

        /// Output the summary as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}
