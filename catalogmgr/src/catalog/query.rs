// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Read-side operations on the catalog manager
//!
//! Every read takes the registry read lock, so a reader sees either all or none
//! of any mutation. Lookups that reach into a connector first copy the
//! catalog handles they need and release the lock before calling out.
//!
//! Returned `Arc<Catalog>` handles are snapshots. RENAME and ALTER PROPERTIES
//! install a new catalog value under the same id, so a held handle keeps the
//! name and properties it had when it was fetched; look the catalog up again
//! to observe later changes.

use super::error::{CatalogError, CatalogResult};
use super::manager::CatalogManager;
use super::traits::{PrivAction, UserIdentity};
use super::types::{Catalog, CatalogId, DatabaseId, DatabaseInfo};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Column headers of an unfiltered SHOW CATALOGS
pub const SHOW_CATALOGS_COLUMNS: [&str; 3] = ["CatalogId", "CatalogName", "Type"];

/// Column headers of SHOW CATALOG <name>
pub const SHOW_CATALOG_PROPERTIES_COLUMNS: [&str; 2] = ["Key", "Value"];

/// Tabular result of a SHOW statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ShowResultSet {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CatalogManager {
    /// Look a catalog up by name
    ///
    /// The handle is an immutable snapshot of the catalog at lookup time.
    pub fn get_catalog(&self, name: &str) -> Option<Arc<Catalog>> {
        self.registry.read().by_name(name).cloned()
    }

    /// Look a catalog up by id
    pub fn get_catalog_by_id(&self, id: CatalogId) -> Option<Arc<Catalog>> {
        self.registry.read().by_id(id).cloned()
    }

    /// Like `get_catalog`, but a missing name is an error
    pub fn get_catalog_or_err(&self, name: &str) -> CatalogResult<Arc<Catalog>> {
        self.get_catalog(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// The built-in catalog
    pub fn internal_catalog(&self) -> Arc<Catalog> {
        self.registry.read().internal().clone()
    }

    /// All catalogs, ordered by id
    pub fn list_catalogs(&self) -> Vec<Arc<Catalog>> {
        self.registry.read().all().cloned().collect()
    }

    /// All catalog ids, ascending
    pub fn catalog_ids(&self) -> Vec<CatalogId> {
        self.registry.read().id_index().keys().copied().collect()
    }

    /// Ids of every database in every catalog, internal catalog first
    pub fn list_database_ids(&self) -> Vec<DatabaseId> {
        self.catalogs_internal_first()
            .iter()
            .flat_map(|catalog| self.database_ids_of(catalog))
            .collect()
    }

    /// Names of every database in every catalog, internal catalog first
    pub fn list_database_names(&self) -> Vec<String> {
        self.catalogs_internal_first()
            .iter()
            .flat_map(|catalog| match self.collaborators.connectors.for_catalog(catalog) {
                Some(connector) => connector.database_names(catalog),
                None => Vec::new(),
            })
            .collect()
    }

    /// Find the database with `id`, trying the internal catalog first
    pub fn find_database_by_id(&self, id: DatabaseId) -> Option<(Arc<Catalog>, DatabaseInfo)> {
        self.catalogs_internal_first().into_iter().find_map(|catalog| {
            let database = self
                .collaborators
                .connectors
                .for_catalog(&catalog)?
                .database_by_id(&catalog, id)?;
            Some((catalog, database))
        })
    }

    /// SHOW CATALOGS [<name>]
    ///
    /// Without a filter, one `(id, name, type)` row per catalog the user may
    /// see, ordered by id. With a filter, one `(key, value)` row per property
    /// of that catalog, ordered by key.
    ///
    /// # Returns
    /// * `Err(CatalogError::NotFound)` if the filtered catalog is absent
    /// * `Err(CatalogError::AccessDenied)` if the user may not see it
    pub fn show_catalogs(
        &self,
        user: &UserIdentity,
        name: Option<&str>,
    ) -> CatalogResult<ShowResultSet> {
        let checker = &self.collaborators.privileges;

        let Some(name) = name else {
            let mut result = ShowResultSet::new(&SHOW_CATALOGS_COLUMNS);
            for catalog in self.list_catalogs() {
                if !checker.check_catalog_priv(user, catalog.name(), PrivAction::Show) {
                    continue;
                }
                result.rows.push(vec![
                    catalog.id().to_string(),
                    catalog.name().to_string(),
                    catalog.catalog_type().to_string(),
                ]);
            }
            return Ok(result);
        };

        let catalog = self.get_catalog_or_err(name)?;
        if !checker.check_catalog_priv(user, catalog.name(), PrivAction::Show) {
            log::warn!("User {} denied SHOW on catalog {}", user, name);
            return Err(CatalogError::AccessDenied {
                user: user.to_string(),
                catalog: name.to_string(),
            });
        }

        let mut result = ShowResultSet::new(&SHOW_CATALOG_PROPERTIES_COLUMNS);
        for (key, value) in catalog.properties() {
            result.rows.push(vec![key.clone(), value.clone()]);
        }
        Ok(result)
    }

    fn catalogs_internal_first(&self) -> Vec<Arc<Catalog>> {
        let registry = self.registry.read();
        let internal = registry.internal().clone();
        let mut catalogs = vec![internal.clone()];
        catalogs.extend(registry.all().filter(|c| c.id() != internal.id()).cloned());
        catalogs
    }

    fn database_ids_of(&self, catalog: &Catalog) -> Vec<DatabaseId> {
        match self.collaborators.connectors.for_catalog(catalog) {
            Some(connector) => connector.database_ids(catalog),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::connectors::{ConnectorRegistry, InMemoryConnector};
    use crate::catalog::idgen::MonotonicIdGenerator;
    use crate::catalog::manager::Collaborators;
    use crate::catalog::privilege::GrantTable;
    use crate::catalog::types::{CatalogProperties, INTERNAL_CATALOG_ID, INTERNAL_CATALOG_TYPE};
    use crate::editlog::MemoryEditLog;

    struct Fixture {
        manager: CatalogManager,
        grants: Arc<GrantTable>,
        internal_dbs: Arc<InMemoryConnector>,
        hive_dbs: Arc<InMemoryConnector>,
    }

    fn fixture() -> Fixture {
        let internal_dbs = Arc::new(InMemoryConnector::new());
        let hive_dbs = Arc::new(InMemoryConnector::new());
        let grants = Arc::new(GrantTable::new());
        let connectors = ConnectorRegistry::new()
            .with(INTERNAL_CATALOG_TYPE, internal_dbs.clone())
            .with("hive", hive_dbs.clone());
        let collaborators = Collaborators::new(
            Arc::new(MonotonicIdGenerator::starting_at(1000)),
            Arc::new(MemoryEditLog::new()),
        )
        .with_connectors(connectors)
        .with_privileges(grants.clone());

        let manager = CatalogManager::new(collaborators);
        let mut props = CatalogProperties::new();
        props.insert("uri".to_string(), "thrift://meta:9083".to_string());
        manager.create_catalog("hive1", "hive", props, false).unwrap();
        Fixture {
            manager,
            grants,
            internal_dbs,
            hive_dbs,
        }
    }

    #[test]
    fn test_lookups() {
        let f = fixture();
        assert_eq!(f.manager.get_catalog_by_id(1000).unwrap().name(), "hive1");
        assert!(f.manager.get_catalog("missing").is_none());
        assert!(matches!(
            f.manager.get_catalog_or_err("missing"),
            Err(CatalogError::NotFound(_))
        ));
        assert_eq!(f.manager.catalog_ids(), vec![INTERNAL_CATALOG_ID, 1000]);
        assert_eq!(f.manager.list_catalogs().len(), 2);
    }

    #[test]
    fn test_held_handle_is_a_snapshot() {
        let f = fixture();
        let held = f.manager.get_catalog("hive1").unwrap();

        let mut props = CatalogProperties::new();
        props.insert("type".to_string(), "hive".to_string());
        props.insert("k".to_string(), "v".to_string());
        f.manager.alter_catalog_properties("hive1", props).unwrap();
        f.manager.rename_catalog("hive1", "lake").unwrap();

        assert_eq!(held.name(), "hive1");
        assert!(held.properties().get("k").is_none());

        let current = f.manager.get_catalog_by_id(held.id()).unwrap();
        assert_eq!(current.name(), "lake");
        assert_eq!(current.properties().get("k").unwrap(), "v");
        assert_eq!(current.properties().get("uri").unwrap(), "thrift://meta:9083");
    }

    #[test]
    fn test_find_database_prefers_internal() {
        let f = fixture();
        f.internal_dbs
            .add_database(INTERNAL_CATALOG_ID, DatabaseInfo::new(10, "sales"));
        f.hive_dbs.add_database(1000, DatabaseInfo::new(10, "lake_sales"));
        f.hive_dbs.add_database(1000, DatabaseInfo::new(20, "lake_logs"));

        let (catalog, db) = f.manager.find_database_by_id(10).unwrap();
        assert!(catalog.is_internal());
        assert_eq!(db.name, "sales");

        let (catalog, db) = f.manager.find_database_by_id(20).unwrap();
        assert_eq!(catalog.name(), "hive1");
        assert_eq!(db.name, "lake_logs");

        assert!(f.manager.find_database_by_id(99).is_none());
        assert_eq!(f.manager.list_database_ids(), vec![10, 10, 20]);
        assert_eq!(
            f.manager.list_database_names(),
            vec!["sales", "lake_sales", "lake_logs"]
        );
    }

    #[test]
    fn test_show_catalogs_filters_by_privilege() {
        let f = fixture();
        let alice = UserIdentity::new("alice");

        assert!(f.manager.show_catalogs(&alice, None).unwrap().is_empty());

        f.grants.grant("alice", "hive1", PrivAction::Show);
        let result = f.manager.show_catalogs(&alice, None).unwrap();
        assert_eq!(result.columns, SHOW_CATALOGS_COLUMNS);
        assert_eq!(result.rows, vec![vec!["1000", "hive1", "hive"]]);

        let admin = UserIdentity::new("admin");
        assert_eq!(f.manager.show_catalogs(&admin, None).unwrap().len(), 2);
    }

    #[test]
    fn test_show_single_catalog_properties() {
        let f = fixture();
        let bob = UserIdentity::new("bob");

        assert_eq!(
            f.manager.show_catalogs(&bob, Some("hive1")),
            Err(CatalogError::AccessDenied {
                user: "bob".to_string(),
                catalog: "hive1".to_string(),
            })
        );
        assert!(matches!(
            f.manager.show_catalogs(&bob, Some("nope")),
            Err(CatalogError::NotFound(_))
        ));

        f.grants.grant("bob", "*", PrivAction::Show);
        let result = f.manager.show_catalogs(&bob, Some("hive1")).unwrap();
        assert_eq!(result.columns, SHOW_CATALOG_PROPERTIES_COLUMNS);
        assert_eq!(
            result.rows,
            vec![
                vec!["type".to_string(), "hive".to_string()],
                vec!["uri".to_string(), "thrift://meta:9083".to_string()],
            ]
        );
    }
}
