mod artifact;
mod clear_cache;
mod context;
mod deps;
mod tree;
mod versions;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use context::GlobalArgs;

#[derive(Parser, Debug)]
#[command(name = "forge-deps")]
#[command(about = "Resolve artifact versions and dependency trees")]
#[command(version)]
struct Args {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the published versions of an artifact, newest first
    Versions(versions::VersionsArgs),

    /// Resolve a single artifact and print where its file lives
    Artifact(artifact::ArtifactArgs),

    /// Print the flattened, mediated dependency set
    Deps(deps::DepsArgs),

    /// Print the mediated dependency tree
    Tree(tree::TreeArgs),

    /// Remove cached repository answers
    ClearCache(clear_cache::ClearCacheArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run() -> Result<i32> {
    let args = Args::parse();
    init_logging(args.global.verbose);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| anyhow::anyhow!("Failed to create async runtime: {}", e))?;

    match args.command {
        Commands::Versions(cmd) => rt.block_on(versions::execute(&args.global, cmd)),
        Commands::Artifact(cmd) => rt.block_on(artifact::execute(&args.global, cmd)),
        Commands::Deps(cmd) => rt.block_on(deps::execute(&args.global, cmd)),
        Commands::Tree(cmd) => rt.block_on(tree::execute(&args.global, cmd)),
        Commands::ClearCache(cmd) => rt.block_on(clear_cache::execute(&args.global, cmd)),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
