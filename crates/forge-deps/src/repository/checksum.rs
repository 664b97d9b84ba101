//! Checksum verification for downloaded artifacts.

use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Supported sidecar checksum types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumType {
    Sha1,
    Sha256,
}

impl ChecksumType {
    /// Sidecar extension, tried in this order
    pub const ALL: [ChecksumType; 2] = [ChecksumType::Sha256, ChecksumType::Sha1];

    pub fn extension(&self) -> &'static str {
        match self {
            ChecksumType::Sha1 => "sha1",
            ChecksumType::Sha256 => "sha256",
        }
    }

    /// Detect checksum type from length of hex string
    pub fn from_hex_length(len: usize) -> Option<Self> {
        match len {
            40 => Some(ChecksumType::Sha1),
            64 => Some(ChecksumType::Sha256),
            _ => None,
        }
    }
}

/// Extract the hex digest from sidecar content (`<hex>` or `<hex>  <file name>`)
pub fn parse_sidecar(content: &str) -> Option<&str> {
    content.split_whitespace().next().filter(|s| !s.is_empty())
}

pub async fn compute(path: &Path, checksum_type: ChecksumType) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).await?;

    Ok(match checksum_type {
        ChecksumType::Sha1 => {
            let mut hasher = Sha1::new();
            hasher.update(&buffer);
            format!("{:x}", hasher.finalize())
        }
        ChecksumType::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(&buffer);
            format!("{:x}", hasher.finalize())
        }
    })
}

/// Verify checksum of a file
pub async fn verify(path: &Path, expected: &str, checksum_type: ChecksumType) -> std::io::Result<bool> {
    let actual = compute(path, checksum_type).await?;
    Ok(actual.eq_ignore_ascii_case(expected.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_checksum_type_from_hex_length() {
        assert_eq!(ChecksumType::from_hex_length(40), Some(ChecksumType::Sha1));
        assert_eq!(ChecksumType::from_hex_length(64), Some(ChecksumType::Sha256));
        assert_eq!(ChecksumType::from_hex_length(32), None);
    }

    #[test]
    fn test_parse_sidecar() {
        assert_eq!(parse_sidecar("abc123  lib-1.0.jar\n"), Some("abc123"));
        assert_eq!(parse_sidecar("abc123"), Some("abc123"));
        assert_eq!(parse_sidecar("   \n"), None);
    }

    #[tokio::test]
    async fn test_verify() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), b"hello world").unwrap();

        let sha256 = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
        let sha1 = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";
        assert!(verify(temp_file.path(), sha256, ChecksumType::Sha256).await.unwrap());
        assert!(verify(temp_file.path(), sha1, ChecksumType::Sha1).await.unwrap());
        assert!(!verify(temp_file.path(), &"0".repeat(64), ChecksumType::Sha256).await.unwrap());
    }
}
