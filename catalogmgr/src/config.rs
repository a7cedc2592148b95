// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog manager configuration

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::catalog::privilege::GrantSpec;
use crate::catalog::types::INTERNAL_CATALOG_NAME;
use crate::editlog::file::DEFAULT_MAX_SEGMENT_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subdirectory of `meta_dir` holding edit log segments
pub const EDIT_LOG_SUBDIR: &str = "editlog";

/// Configuration for opening a catalog manager from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding the edit log and snapshot images
    pub meta_dir: PathBuf,

    /// First id handed out when no catalog has been created yet
    pub first_catalog_id: i64,

    /// Display name of the internal catalog
    pub internal_catalog_name: String,

    /// fsync after every edit log append
    pub sync_on_append: bool,

    /// Rotate edit log segments past this size (bytes)
    pub max_log_file_bytes: u64,

    /// Catalog types that get a connector, and so may be created
    pub catalog_types: Vec<String>,

    /// Explicit privilege grants; empty means every user may see everything
    pub grants: Vec<GrantSpec>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            meta_dir: PathBuf::from("./catalog-meta"),
            first_catalog_id: 1000,
            internal_catalog_name: INTERNAL_CATALOG_NAME.to_string(),
            sync_on_append: true,
            max_log_file_bytes: DEFAULT_MAX_SEGMENT_BYTES,
            catalog_types: ["hive", "es", "jdbc", "iceberg"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            grants: Vec::new(),
        }
    }
}

impl CatalogConfig {
    /// Default configuration rooted at `meta_dir`
    pub fn with_meta_dir(meta_dir: impl Into<PathBuf>) -> Self {
        Self {
            meta_dir: meta_dir.into(),
            ..Self::default()
        }
    }

    /// Load a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            CatalogError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the manager cannot run with
    pub fn validate(&self) -> CatalogResult<()> {
        if self.first_catalog_id <= 0 {
            return Err(CatalogError::Config(format!(
                "first_catalog_id must be positive, got {}",
                self.first_catalog_id
            )));
        }
        if self.internal_catalog_name.trim().is_empty() {
            return Err(CatalogError::Config(
                "internal_catalog_name must not be empty".to_string(),
            ));
        }
        if self.max_log_file_bytes == 0 {
            return Err(CatalogError::Config(
                "max_log_file_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn edit_log_dir(&self) -> PathBuf {
        self.meta_dir.join(EDIT_LOG_SUBDIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::PrivAction;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.first_catalog_id, 1000);
        assert_eq!(config.internal_catalog_name, "internal");
        assert!(config.sync_on_append);
        assert_eq!(config.edit_log_dir(), PathBuf::from("./catalog-meta/editlog"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"meta_dir": "/var/lib/catalogs",
                "grants": [{{"user": "alice", "catalog": "*", "actions": ["show"]}}]}}"#
        )
        .unwrap();

        let config = CatalogConfig::from_file(file.path()).unwrap();
        assert_eq!(config.meta_dir, PathBuf::from("/var/lib/catalogs"));
        assert_eq!(config.first_catalog_id, 1000);
        assert_eq!(config.grants.len(), 1);
        assert_eq!(config.grants[0].actions, vec![PrivAction::Show]);
    }

    #[test]
    fn test_from_file_rejects_bad_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"first_catalog_id": 0}}"#).unwrap();
        assert!(matches!(
            CatalogConfig::from_file(file.path()),
            Err(CatalogError::Config(_))
        ));

        assert!(matches!(
            CatalogConfig::from_file("/definitely/not/here.json"),
            Err(CatalogError::Config(_))
        ));
    }
}
