//! `ecosys resolve <ENV_NAME>`

use anyhow::Result;

use crate::cli::ResolverArgs;

pub fn cmd_resolve(env_name: &str, args: &ResolverArgs, json: bool) -> Result<()> {
    let resolver = super::build_resolver(args)?;
    let resolution = resolver.resolve_detailed(env_name);
    if json {
        println!("{}", serde_json::to_string(&resolution)?);
    } else {
        println!("{}", resolution.path);
    }
    Ok(())
}
