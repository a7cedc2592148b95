// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connector dispatch table
//!
//! Behavior that differs per data source kind is looked up here by the
//! catalog's type tag instead of living on the catalog itself. Adding a new
//! source kind means implementing `DataSourceConnector` and registering it
//! under its type name.

use super::traits::DataSourceConnector;
use super::types::{Catalog, CatalogId, DatabaseId, DatabaseInfo, INTERNAL_CATALOG_TYPE};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Type tag -> connector
#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn DataSourceConnector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector for a catalog type. Type names are case-insensitive.
    pub fn register(&mut self, catalog_type: &str, connector: Arc<dyn DataSourceConnector>) {
        self.connectors
            .insert(catalog_type.to_ascii_lowercase(), connector);
        log::info!("Registered data source connector: {}", catalog_type);
    }

    /// Builder-style `register`
    pub fn with(mut self, catalog_type: &str, connector: Arc<dyn DataSourceConnector>) -> Self {
        self.register(catalog_type, connector);
        self
    }

    pub fn get(&self, catalog_type: &str) -> Option<&Arc<dyn DataSourceConnector>> {
        self.connectors.get(&catalog_type.to_ascii_lowercase())
    }

    /// Connector serving `catalog`, if its type has one
    pub fn for_catalog(&self, catalog: &Catalog) -> Option<&Arc<dyn DataSourceConnector>> {
        self.get(catalog.catalog_type())
    }

    /// Whether external catalogs of this type can be created
    pub fn supports(&self, catalog_type: &str) -> bool {
        !catalog_type.eq_ignore_ascii_case(INTERNAL_CATALOG_TYPE) && self.get(catalog_type).is_some()
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.connectors.keys().cloned().collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

/// Connector backed by an in-process table of databases per catalog id
///
/// Serves the internal catalog and stands in for remote sources in tests and
/// in the CLI.
#[derive(Debug, Default)]
pub struct InMemoryConnector {
    databases: RwLock<HashMap<CatalogId, BTreeMap<DatabaseId, DatabaseInfo>>>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_database(&self, catalog_id: CatalogId, database: DatabaseInfo) {
        self.databases
            .write()
            .entry(catalog_id)
            .or_default()
            .insert(database.id, database);
    }

    pub fn remove_database(&self, catalog_id: CatalogId, database_id: DatabaseId) {
        if let Some(databases) = self.databases.write().get_mut(&catalog_id) {
            databases.remove(&database_id);
        }
    }
}

impl DataSourceConnector for InMemoryConnector {
    fn database_ids(&self, catalog: &Catalog) -> Vec<DatabaseId> {
        self.databases
            .read()
            .get(&catalog.id())
            .map(|dbs| dbs.keys().copied().collect())
            .unwrap_or_default()
    }

    fn database_names(&self, catalog: &Catalog) -> Vec<String> {
        self.databases
            .read()
            .get(&catalog.id())
            .map(|dbs| dbs.values().map(|db| db.name.clone()).collect())
            .unwrap_or_default()
    }

    fn database_by_id(&self, catalog: &Catalog, id: DatabaseId) -> Option<DatabaseInfo> {
        self.databases
            .read()
            .get(&catalog.id())
            .and_then(|dbs| dbs.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::CatalogProperties;

    #[test]
    fn test_dispatch_by_type_is_case_insensitive() {
        let connector = Arc::new(InMemoryConnector::new());
        let registry = ConnectorRegistry::new().with("hive", connector);

        assert!(registry.supports("HIVE"));
        assert!(!registry.supports("es"));
        assert!(!registry.supports(INTERNAL_CATALOG_TYPE));

        let catalog = Catalog::external(1000, "hive1", "Hive", CatalogProperties::new());
        assert!(registry.for_catalog(&catalog).is_some());
    }

    #[test]
    fn test_in_memory_connector_scopes_by_catalog() {
        let connector = InMemoryConnector::new();
        connector.add_database(1000, DatabaseInfo::new(1, "sales"));
        connector.add_database(1001, DatabaseInfo::new(2, "logs"));

        let hive = Catalog::external(1000, "hive1", "hive", CatalogProperties::new());
        assert_eq!(connector.database_ids(&hive), vec![1]);
        assert_eq!(connector.database_names(&hive), vec!["sales".to_string()]);
        assert!(connector.database_by_id(&hive, 2).is_none());

        connector.remove_database(1000, 1);
        assert!(connector.database_ids(&hive).is_empty());
    }
}
