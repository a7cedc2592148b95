// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Unified catalog manager - The single external interface
//!
//! CatalogManager owns the registry and serializes every mutation behind one
//! fair read/write lock. A mutation follows the same shape for all four
//! operations:
//!
//! 1. take the write lock
//! 2. validate the request against the current state
//! 3. (CREATE only) allocate an id
//! 4. build a `CatalogLog` and check it against the replay engine
//! 5. append it to the edit log
//! 6. apply it through the replay engine
//!
//! The append happens before the in-memory change. A failed append therefore
//! leaves memory untouched, and once the entry is durable the replay engine
//! cannot reject it because step 4 already ran under the same lock.

use super::connectors::ConnectorRegistry;
use super::error::{CatalogError, CatalogResult};
use super::operations::{CatalogLog, MutationOutcome};
use super::persistence;
use super::privilege::AllowAllPrivileges;
use super::registry::CatalogRegistry;
use super::replay;
use super::traits::{IdGenerator, PrivilegeChecker};
use super::types::{
    normalize_create_properties, Catalog, CatalogProperties, INTERNAL_CATALOG_NAME,
    INTERNAL_CATALOG_TYPE, TYPE_PROPERTY,
};
use crate::editlog::{EditLog, EditLogEntry};
use parking_lot::RwLock;
use std::sync::Arc;

/// External services the manager depends on
#[derive(Clone)]
pub struct Collaborators {
    /// Allocates catalog ids at CREATE time
    pub id_generator: Arc<dyn IdGenerator>,
    /// Durable edit log
    pub edit_log: Arc<dyn EditLog>,
    /// Privilege checks for SHOW CATALOGS
    pub privileges: Arc<dyn PrivilegeChecker>,
    /// Per-type database enumeration
    pub connectors: ConnectorRegistry,
}

impl Collaborators {
    /// Collaborators that allow every privilege and know no connectors
    pub fn new(id_generator: Arc<dyn IdGenerator>, edit_log: Arc<dyn EditLog>) -> Self {
        Self {
            id_generator,
            edit_log,
            privileges: Arc::new(AllowAllPrivileges),
            connectors: ConnectorRegistry::new(),
        }
    }

    pub fn with_privileges(mut self, privileges: Arc<dyn PrivilegeChecker>) -> Self {
        self.privileges = privileges;
        self
    }

    pub fn with_connectors(mut self, connectors: ConnectorRegistry) -> Self {
        self.connectors = connectors;
        self
    }
}

/// Catalog manager - owns the registry and coordinates mutations
pub struct CatalogManager {
    /// Registry guarded by a fair lock; parking_lot's RwLock does not starve
    /// writers under a steady stream of readers
    pub(super) registry: RwLock<CatalogRegistry>,
    pub(super) collaborators: Collaborators,
    /// Reject CREATE for types without a registered connector
    require_registered_types: bool,
}

impl CatalogManager {
    /// Create a manager whose registry holds only the internal catalog
    pub fn new(collaborators: Collaborators) -> Self {
        Self::with_registry(collaborators, CatalogRegistry::new(INTERNAL_CATALOG_NAME))
    }

    /// Create a manager over an existing registry, e.g. one rebuilt by recovery
    pub fn with_registry(collaborators: Collaborators, registry: CatalogRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
            collaborators,
            require_registered_types: true,
        }
    }

    /// Whether CREATE must name a type with a registered connector
    pub fn require_registered_types(mut self, require: bool) -> Self {
        self.require_registered_types = require;
        self
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Create an external catalog
    ///
    /// # Arguments
    /// * `name` - Catalog name, unique among all catalogs
    /// * `catalog_type` - Data source kind, e.g. `hive`
    /// * `properties` - Connector configuration; `type` is filled in if absent
    /// * `if_not_exists` - Return `NoOpAlreadyExists` instead of failing when
    ///   the name is taken
    ///
    /// # Returns
    /// * `Ok(MutationOutcome::Applied)` once the entry is logged and applied
    /// * `Err(CatalogError::AlreadyExists)` if the name is taken
    /// * `Err(CatalogError::UnsupportedCatalogType)` for `internal` or an
    ///   unregistered type
    /// * `Err(CatalogError::InvalidProperties)` if `properties["type"]`
    ///   disagrees with `catalog_type`
    /// * `Err(CatalogError::LogAppendFailure)` if the edit log append failed
    pub fn create_catalog(
        &self,
        name: &str,
        catalog_type: &str,
        properties: CatalogProperties,
        if_not_exists: bool,
    ) -> CatalogResult<MutationOutcome> {
        let mut registry = self.registry.write();

        if registry.by_name(name).is_some() {
            if if_not_exists {
                log::warn!("Catalog {} is already exist.", name);
                return Ok(MutationOutcome::NoOpAlreadyExists);
            }
            return Err(CatalogError::AlreadyExists(name.to_string()));
        }

        if catalog_type.eq_ignore_ascii_case(INTERNAL_CATALOG_TYPE)
            || (self.require_registered_types
                && !self.collaborators.connectors.supports(catalog_type))
        {
            return Err(CatalogError::UnsupportedCatalogType(catalog_type.to_string()));
        }
        let catalog_type = catalog_type.to_ascii_lowercase();
        let properties = normalize_create_properties(&catalog_type, properties)
            .map_err(CatalogError::InvalidProperties)?;

        let id = self.collaborators.id_generator.next_id();
        let catalog = Catalog::external(id, name, catalog_type, properties);
        self.commit(&mut registry, CatalogLog::create(catalog))
    }

    /// Drop a catalog by name
    ///
    /// # Returns
    /// * `Ok(MutationOutcome::NoOpNotFound)` if absent and `if_exists` is set
    /// * `Err(CatalogError::NotFound)` if absent otherwise
    /// * `Err(CatalogError::InternalCatalogProtected)` for the internal catalog
    pub fn drop_catalog(&self, name: &str, if_exists: bool) -> CatalogResult<MutationOutcome> {
        let mut registry = self.registry.write();

        let Some(catalog) = registry.by_name(name).cloned() else {
            if if_exists {
                log::warn!("Non catalog {} is found.", name);
                return Ok(MutationOutcome::NoOpNotFound);
            }
            return Err(CatalogError::NotFound(name.to_string()));
        };
        protect_internal(&catalog, "dropped")?;

        self.commit(&mut registry, CatalogLog::drop(catalog.id()))
    }

    /// Rename a catalog, keeping its id
    ///
    /// # Returns
    /// * `Err(CatalogError::NotFound)` if `old_name` is absent
    /// * `Err(CatalogError::AlreadyExists)` if `new_name` is held by another catalog
    /// * `Err(CatalogError::InternalCatalogProtected)` for the internal catalog
    ///
    /// Renaming a catalog to its current name is logged and applied like any
    /// other rename; it leaves the registry unchanged.
    pub fn rename_catalog(&self, old_name: &str, new_name: &str) -> CatalogResult<MutationOutcome> {
        let mut registry = self.registry.write();

        let catalog = registry
            .by_name(old_name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(old_name.to_string()))?;
        protect_internal(&catalog, "renamed")?;
        if let Some(holder) = registry.by_name(new_name) {
            if holder.id() != catalog.id() {
                return Err(CatalogError::AlreadyExists(new_name.to_string()));
            }
        }

        self.commit(&mut registry, CatalogLog::rename(catalog.id(), new_name))
    }

    /// Merge new properties into a catalog
    ///
    /// The map must carry the catalog's current `type` (compared
    /// case-insensitively). It is checked and then stripped before merging.
    ///
    /// # Returns
    /// * `Err(CatalogError::NotFound)` if `name` is absent
    /// * `Err(CatalogError::ImmutableFieldViolation)` if `type` is missing or
    ///   differs; nothing is logged or modified in that case
    /// * `Err(CatalogError::InternalCatalogProtected)` for the internal catalog
    pub fn alter_catalog_properties(
        &self,
        name: &str,
        mut new_properties: CatalogProperties,
    ) -> CatalogResult<MutationOutcome> {
        let mut registry = self.registry.write();

        let catalog = registry
            .by_name(name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;
        protect_internal(&catalog, "altered")?;

        let requested = new_properties
            .remove(TYPE_PROPERTY)
            .unwrap_or_default();
        if !requested.eq_ignore_ascii_case(catalog.catalog_type()) {
            return Err(CatalogError::ImmutableFieldViolation {
                name: name.to_string(),
                current: catalog.catalog_type().to_string(),
                requested,
            });
        }

        self.commit(
            &mut registry,
            CatalogLog::alter_props(catalog.id(), new_properties),
        )
    }

    /// Apply an entry delivered by the edit log. Nothing is re-appended.
    pub fn replay(&self, log: &CatalogLog) -> CatalogResult<()> {
        let mut registry = self.registry.write();
        replay::apply(&mut registry, log)
    }

    /// Apply delivered entries in order, stopping at the first failure
    ///
    /// # Returns
    /// * `Ok(usize)` with the number of entries applied
    pub fn replay_all<'a, I>(&self, entries: I) -> CatalogResult<usize>
    where
        I: IntoIterator<Item = &'a EditLogEntry>,
    {
        let mut registry = self.registry.write();
        let mut applied = 0;
        for entry in entries {
            replay::apply(&mut registry, &entry.payload)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Serialize the current state
    pub fn snapshot(&self) -> CatalogResult<Vec<u8>> {
        persistence::serialize(&self.registry.read())
    }

    /// Serialize the current state together with the last edit log sequence it
    /// reflects. Both are read under the same lock, so no mutation can fall
    /// between them.
    pub fn snapshot_with_sequence(&self) -> CatalogResult<(Vec<u8>, u64)> {
        let registry = self.registry.read();
        let sequence = self.collaborators.edit_log.last_sequence();
        Ok((persistence::serialize(&registry)?, sequence))
    }

    /// Copy of the registry, for comparisons and diagnostics
    pub fn registry_snapshot(&self) -> CatalogRegistry {
        self.registry.read().clone()
    }

    /// Validate, append, then apply. Runs under the caller's write lock.
    fn commit(
        &self,
        registry: &mut CatalogRegistry,
        entry: CatalogLog,
    ) -> CatalogResult<MutationOutcome> {
        replay::validate(registry, &entry)?;

        let sequence = self
            .collaborators
            .edit_log
            .append(entry.op, &entry)
            .map_err(|e| CatalogError::LogAppendFailure(e.to_string()))?;

        replay::apply(registry, &entry)?;

        log::info!(
            "Catalog {} applied for id {} (edit log sequence {})",
            entry.op,
            entry.catalog_id,
            sequence
        );
        Ok(MutationOutcome::Applied)
    }
}

impl std::fmt::Debug for CatalogManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogManager")
            .field("catalogs", &self.registry.read().len())
            .field("connectors", &self.collaborators.connectors)
            .field("require_registered_types", &self.require_registered_types)
            .finish()
    }
}

fn protect_internal(catalog: &Catalog, action: &str) -> CatalogResult<()> {
    if catalog.is_internal() {
        return Err(CatalogError::InternalCatalogProtected {
            name: catalog.name().to_string(),
            action: action.to_string(),
        });
    }
    Ok(())
}
