//! Deps command - print the flattened dependency set.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use forge_deps::query::filters;
use forge_deps::{Dependency, DependencyQueryBuilder};

use crate::context::{parse_exclusions, GlobalArgs};

#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Root artifact coordinate
    #[arg(value_name = "COORDINATE")]
    pub coordinate: String,

    /// Only list dependencies with this classifier
    #[arg(long)]
    pub classifier: Option<String>,

    /// Exclude a group:artifact (wildcards allowed) from the whole tree
    #[arg(long = "exclude", value_name = "G:A", action = clap::ArgAction::Append)]
    pub exclusions: Vec<String>,

    /// Leave optional dependencies out of the listing
    #[arg(long)]
    pub no_optional: bool,
}

pub async fn execute(global: &GlobalArgs, args: DepsArgs) -> Result<i32> {
    let resolver = global.resolver()?;

    let by_classifier = args.classifier.clone().map(filters::classifier);
    let non_optional = filters::non_optional();
    let no_optional = args.no_optional;
    let query = DependencyQueryBuilder::parse(&args.coordinate)?
        .with_exclusions(parse_exclusions(&args.exclusions)?)
        .with_filter(move |dependency: &Dependency| {
            by_classifier.as_ref().map_or(true, |accepts| accepts(dependency))
                && (!no_optional || non_optional(dependency))
        });

    let dependencies = resolver
        .resolve_dependencies(query)
        .await
        .with_context(|| format!("Failed to resolve dependencies of {}", args.coordinate))?;

    let mut lines: Vec<String> = dependencies.iter().map(|d| d.to_string()).collect();
    lines.sort();
    for line in &lines {
        println!("{}", line);
    }
    println!("\n{} {} dependencies", style("Total:").bold(), lines.len());
    Ok(0)
}
