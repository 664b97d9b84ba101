//! Versions command - list the published versions of an artifact.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use forge_deps::DependencyQueryBuilder;

use crate::context::GlobalArgs;

#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Artifact coordinate; a version or range restricts the list
    #[arg(value_name = "COORDINATE")]
    pub coordinate: String,

    /// Ignore cached version lists
    #[arg(long)]
    pub refresh: bool,
}

pub async fn execute(global: &GlobalArgs, args: VersionsArgs) -> Result<i32> {
    let resolver = global.resolver()?;
    let query = DependencyQueryBuilder::parse(&args.coordinate)?.with_refresh(args.refresh);

    let versions = resolver
        .resolve_versions(query)
        .await
        .with_context(|| format!("Failed to list versions of {}", args.coordinate))?;

    if versions.is_empty() {
        println!("{} No version of {} matches", style("Info:").cyan(), args.coordinate);
        return Ok(0);
    }
    for coordinate in versions {
        println!("{}", coordinate.version().unwrap_or_default());
    }
    Ok(0)
}
