use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

use crate::error::ScanError;

/// EAN prefixes accepted for ISBN-13 unless configured otherwise.
pub const DEFAULT_ISBN13_PREFIXES: [&str; 3] = ["977", "978", "979"];

/// Pages scanned from the start of a long PDF.
pub const FRONT_PAGES: u32 = 25;

/// Pages scanned from the end of a long PDF when the front had no ISBN-13.
pub const BACK_PAGES: u32 = 15;

/// Settings for one scan session or batch.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Three-digit prefixes an ISBN-13 must start with.
    pub valid_isbn13_prefixes: Vec<String>,
    pub front_pages: u32,
    pub back_pages: u32,
    /// Worker threads used for batch scans.
    pub workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            valid_isbn13_prefixes: DEFAULT_ISBN13_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            front_pages: FRONT_PAGES,
            back_pages: BACK_PAGES,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl ScanConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<ScanConfig, ScanError> {
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse_str(&content).map_err(|e| ScanError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a config from a JSON string (no file path context).
    pub fn parse_str(json: &str) -> Result<ScanConfig, ScanError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.valid_isbn13_prefixes = prefixes;
        self
    }

    /// The validated prefix set.
    ///
    /// An empty list, or one containing anything other than three ASCII
    /// digits, falls back to [`DEFAULT_ISBN13_PREFIXES`].
    pub fn prefix_set(&self) -> BTreeSet<String> {
        let prefixes: BTreeSet<String> = self
            .valid_isbn13_prefixes
            .iter()
            .map(|p| p.trim().to_string())
            .collect();

        let malformed = prefixes
            .iter()
            .find(|p| p.len() != 3 || !p.bytes().all(|b| b.is_ascii_digit()));

        if let Some(bad) = malformed {
            warn!(prefix = %bad, "invalid ISBN-13 prefix in config, using defaults");
            return default_prefix_set();
        }
        if prefixes.is_empty() {
            warn!("no ISBN-13 prefixes configured, using defaults");
            return default_prefix_set();
        }

        prefixes
    }
}

fn default_prefix_set() -> BTreeSet<String> {
    DEFAULT_ISBN13_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

/// Split a comma separated prefix list such as `"977, 978,979"`.
pub fn parse_prefix_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.front_pages, 25);
        assert_eq!(config.back_pages, 15);
        assert!(config.workers >= 1);
        let set = config.prefix_set();
        assert_eq!(set.len(), 3);
        assert!(set.contains("977") && set.contains("978") && set.contains("979"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ScanConfig::parse_str(r#"{ "front_pages": 10 }"#).unwrap();
        assert_eq!(config.front_pages, 10);
        assert_eq!(config.back_pages, BACK_PAGES);
        assert_eq!(config.valid_isbn13_prefixes.len(), 3);
    }

    #[test]
    fn test_custom_prefixes() {
        let config = ScanConfig::default().with_prefixes(vec!["979".into(), " 978 ".into()]);
        let set = config.prefix_set();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["978", "979"]);
    }

    #[test]
    fn test_malformed_prefixes_fall_back() {
        for bad in [vec![], vec!["97".to_string()], vec!["978".into(), "abc".into()]] {
            let set = ScanConfig::default().with_prefixes(bad).prefix_set();
            assert_eq!(set, default_prefix_set());
        }
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(ScanConfig::parse_str("{ not json").is_err());
        assert!(ScanConfig::parse_str(r#"{ "front_pages": "many" }"#).is_err());
    }

    #[test]
    fn test_parse_prefix_list() {
        assert_eq!(parse_prefix_list("977, 978,979"), vec!["977", "978", "979"]);
        assert_eq!(parse_prefix_list(" , 978 ,"), vec!["978"]);
        assert!(parse_prefix_list("").is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScanConfig::load(Path::new("/nonexistent/isbnscan.json")).unwrap_err();
        assert!(matches!(err, ScanError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("isbnscan.json");
        std::fs::write(&path, r#"{ "back_pages": 5, "valid_isbn13_prefixes": ["979"] }"#).unwrap();
        let config = ScanConfig::load(&path).unwrap();
        assert_eq!(config.back_pages, 5);
        assert_eq!(config.front_pages, FRONT_PAGES);

        std::fs::write(&path, "{ not json").unwrap();
        let err = ScanConfig::load(&path).unwrap_err();
        assert!(matches!(err, ScanError::ConfigLoad { ref reason, .. } if !reason.is_empty()));
    }
}
