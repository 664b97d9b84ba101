//! Artifact command - resolve one artifact to a local file.

use anyhow::{Context, Result};
use clap::Args;
use console::style;

use forge_deps::{CoordinateBuilder, DependencyQueryBuilder};

use crate::context::GlobalArgs;

#[derive(Args, Debug)]
pub struct ArtifactArgs {
    /// Artifact coordinate, version optional
    #[arg(value_name = "COORDINATE")]
    pub coordinate: String,

    /// Classifier of the wanted artifact
    #[arg(long)]
    pub classifier: Option<String>,
}

pub async fn execute(global: &GlobalArgs, args: ArtifactArgs) -> Result<i32> {
    let resolver = global.resolver()?;

    let mut builder = CoordinateBuilder::create(&args.coordinate)?;
    if let Some(classifier) = &args.classifier {
        builder = builder.with_classifier(classifier);
    }
    let query = DependencyQueryBuilder::create(builder.try_build()?);

    let dependency = resolver
        .resolve_artifact(query)
        .await
        .with_context(|| format!("Failed to resolve {}", args.coordinate))?;

    println!("{}", style(dependency.coordinate()).green().bold());
    if let Some(artifact) = dependency.artifact() {
        println!("{}", artifact.path().display());
    }
    Ok(0)
}
