//! Clear-cache command - drop cached repository answers.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use std::path::Path;

use forge_deps::{Resolver, ResolverConfig};

use crate::context::GlobalArgs;

#[derive(Args, Debug)]
pub struct ClearCacheArgs {
    /// Only remove entries older than the cache TTL
    #[arg(long)]
    pub gc: bool,
}

pub async fn execute(global: &GlobalArgs, args: ClearCacheArgs) -> Result<i32> {
    let config = global.config()?;
    let cache_dir = config.cache_dir.clone().unwrap_or_default();
    let resolver = Resolver::from_config(&config).context("Failed to set up the resolver")?;

    if args.gc {
        let freed = resolver.cache().gc().await.context("Failed to collect cache garbage")?;
        println!("{} Freed {}", style("Success:").green().bold(), format_bytes(freed));
        return Ok(0);
    }

    clear(&resolver, &config).await?;
    println!("{} Cleared {}", style("Success:").green().bold(), cache_dir.display());
    Ok(0)
}

/// Drop resolution results and downloaded artifacts
async fn clear(resolver: &Resolver, config: &ResolverConfig) -> Result<()> {
    resolver.refresh().await.context("Failed to clear the cache")?;

    let downloads = config.download_dir();
    remove_dir(&downloads).with_context(|| format!("Failed to remove {}", downloads.display()))
}

fn remove_dir(dir: &Path) -> std::io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clear_removes_downloads_and_results() {
        let cache = tempfile::tempdir().unwrap();
        let config = ResolverConfig::default().with_cache_dir(cache.path());
        let resolver = Resolver::from_config(&config).unwrap();

        let artifact = cache.path().join("artifacts/g/a/1.0/a-1.0.jar");
        std::fs::create_dir_all(artifact.parent().unwrap()).unwrap();
        std::fs::write(&artifact, b"jar").unwrap();
        let result = cache.path().join("resolution/versions/g-a.json");
        std::fs::create_dir_all(result.parent().unwrap()).unwrap();
        std::fs::write(&result, b"{}").unwrap();

        clear(&resolver, &config).await.unwrap();
        assert!(!artifact.exists());
        assert!(!result.exists());

        // nothing left to remove is fine
        clear(&resolver, &config).await.unwrap();
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(12), "12 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }
}
