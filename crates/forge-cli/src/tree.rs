//! Tree command - print the mediated dependency tree.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use forge_deps::DependencyQueryBuilder;

use crate::context::{parse_exclusions, GlobalArgs};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Root artifact coordinate
    #[arg(value_name = "COORDINATE")]
    pub coordinate: String,

    /// Exclude a group:artifact (wildcards allowed) from the whole tree
    #[arg(long = "exclude", value_name = "G:A", action = clap::ArgAction::Append)]
    pub exclusions: Vec<String>,
}

pub async fn execute(global: &GlobalArgs, args: TreeArgs) -> Result<i32> {
    let resolver = global.resolver()?;
    let query = DependencyQueryBuilder::parse(&args.coordinate)?
        .with_exclusions(parse_exclusions(&args.exclusions)?);

    let resolution = resolver
        .resolve(query)
        .await
        .with_context(|| format!("Failed to resolve {}", args.coordinate))?;

    print!("{}", resolution.root);

    if !resolution.substitutions.is_empty() {
        println!("\n{}", style("Conflicts resolved:").bold());
        for substitution in &resolution.substitutions {
            println!("  {}", style(substitution).dim());
        }
    }

    if resolution.diagnostics.is_empty() {
        return Ok(0);
    }
    eprintln!();
    for diagnostic in &resolution.diagnostics {
        eprintln!("{} {}", style("Warning:").yellow().bold(), diagnostic);
    }
    Ok(2)
}
