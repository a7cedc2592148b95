//! In-memory fixture for catalog manager tests
//!
//! Uses only the public crate API.

use catalogmgr::{
    CatalogManager, CatalogProperties, Collaborators, ConnectorRegistry, GrantTable,
    InMemoryConnector, MemoryEditLog, MonotonicIdGenerator, INTERNAL_CATALOG_TYPE,
};
use std::sync::Arc;

/// First id handed out by fixture managers
pub const FIRST_ID: i64 = 1000;

/// Manager with every collaborator reachable from the test
pub struct CatalogFixture {
    pub manager: CatalogManager,
    pub edit_log: Arc<MemoryEditLog>,
    pub grants: Arc<GrantTable>,
    pub internal_dbs: Arc<InMemoryConnector>,
    pub hive_dbs: Arc<InMemoryConnector>,
}

impl CatalogFixture {
    /// Fresh manager holding only the internal catalog. Types `hive` and `es`
    /// have connectors.
    pub fn new() -> Self {
        init_logging();
        let edit_log = Arc::new(MemoryEditLog::new());
        let grants = Arc::new(GrantTable::new());
        let internal_dbs = Arc::new(InMemoryConnector::new());
        let hive_dbs = Arc::new(InMemoryConnector::new());
        let connectors = ConnectorRegistry::new()
            .with(INTERNAL_CATALOG_TYPE, internal_dbs.clone())
            .with("hive", hive_dbs.clone())
            .with("es", Arc::new(InMemoryConnector::new()));

        let collaborators = Collaborators::new(
            Arc::new(MonotonicIdGenerator::starting_at(FIRST_ID)),
            edit_log.clone(),
        )
        .with_connectors(connectors)
        .with_privileges(grants.clone());

        Self {
            manager: CatalogManager::new(collaborators),
            edit_log,
            grants,
            internal_dbs,
            hive_dbs,
        }
    }

    /// Create a `hive` catalog and return its id
    pub fn create_hive(&self, name: &str) -> i64 {
        self.manager
            .create_catalog(name, "hive", props(&[("type", "hive")]), false)
            .expect("create hive catalog");
        self.manager
            .get_catalog(name)
            .expect("catalog just created")
            .id()
    }
}

pub fn props(pairs: &[(&str, &str)]) -> CatalogProperties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
