//! On-disk fixture for recovery tests

use super::catalog_fixture::init_logging;
use catalogmgr::{
    AllowAllPrivileges, CatalogConfig, CatalogStore, ConnectorRegistry, InMemoryConnector,
    RecoveryReport,
};
use std::sync::Arc;
use tempfile::TempDir;

/// Metadata directory that outlives the stores opened over it
pub struct DiskFixture {
    pub config: CatalogConfig,
    _temp_dir: TempDir,
}

impl DiskFixture {
    pub fn new() -> Self {
        init_logging();
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let mut config = CatalogConfig::with_meta_dir(temp_dir.path().join("meta"));
        config.sync_on_append = false;
        Self {
            config,
            _temp_dir: temp_dir,
        }
    }

    /// Small segments so rotation happens within a test
    pub fn with_small_segments(mut self, bytes: u64) -> Self {
        self.config.max_log_file_bytes = bytes;
        self
    }

    /// Recover a store from the directory
    pub fn open(&self) -> (CatalogStore, RecoveryReport) {
        let connectors = ConnectorRegistry::new()
            .with("hive", Arc::new(InMemoryConnector::new()))
            .with("es", Arc::new(InMemoryConnector::new()));
        CatalogStore::open(&self.config, connectors, Arc::new(AllowAllPrivileges))
            .expect("open catalog store")
    }
}
