// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog registry implementation
//!
//! This module provides the CatalogRegistry, the paired id/name index over every
//! catalog. The registry itself is a plain container: callers keep the two
//! indices in step by holding the manager's write lock across `insert` and
//! `remove`.

use super::error::{CatalogError, CatalogResult};
use super::types::{Catalog, CatalogId, INTERNAL_CATALOG_ID};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Dual-indexed set of catalogs
///
/// Both indices hold the same `Arc<Catalog>` for a given catalog. The id index
/// is canonical and persisted; the name index is derived from it.
#[derive(Debug, Clone)]
pub struct CatalogRegistry {
    /// Map of catalog id to catalog
    by_id: BTreeMap<CatalogId, Arc<Catalog>>,
    /// Map of catalog name to catalog
    by_name: HashMap<String, Arc<Catalog>>,
    /// The internal catalog, also present in both indices
    internal: Arc<Catalog>,
}

impl CatalogRegistry {
    /// Create a registry holding only the internal catalog
    ///
    /// # Arguments
    /// * `internal_name` - Display name for the internal catalog
    pub fn new(internal_name: &str) -> Self {
        let internal = Arc::new(Catalog::internal(internal_name));
        let mut registry = Self {
            by_id: BTreeMap::new(),
            by_name: HashMap::new(),
            internal: internal.clone(),
        };
        registry.link(internal);
        registry
    }

    /// Rebuild a registry from its canonical id index
    ///
    /// The name index is regenerated by one pass over `by_id` and the internal
    /// catalog reference is rebound through the reserved id.
    ///
    /// # Returns
    /// * `Err(CatalogError::Deserialization)` if the reserved id is missing or
    ///   two catalogs share a name
    pub fn from_id_index(by_id: BTreeMap<CatalogId, Arc<Catalog>>) -> CatalogResult<Self> {
        let internal = by_id
            .get(&INTERNAL_CATALOG_ID)
            .filter(|catalog| catalog.is_internal())
            .cloned()
            .ok_or_else(|| {
                CatalogError::Deserialization(format!(
                    "internal catalog (id {}) missing from snapshot",
                    INTERNAL_CATALOG_ID
                ))
            })?;

        let mut by_name = HashMap::with_capacity(by_id.len());
        for catalog in by_id.values() {
            if by_name
                .insert(catalog.name().to_string(), catalog.clone())
                .is_some()
            {
                return Err(CatalogError::Deserialization(format!(
                    "duplicate catalog name '{}' in snapshot",
                    catalog.name()
                )));
            }
        }

        Ok(Self {
            by_id,
            by_name,
            internal,
        })
    }

    /// Look up a catalog by id
    pub fn by_id(&self, id: CatalogId) -> Option<&Arc<Catalog>> {
        self.by_id.get(&id)
    }

    /// Look up a catalog by name
    pub fn by_name(&self, name: &str) -> Option<&Arc<Catalog>> {
        self.by_name.get(name)
    }

    /// Insert a catalog into both indices
    pub fn insert(&mut self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        self.link(catalog.clone());
        catalog
    }

    /// Remove a catalog from both indices
    ///
    /// # Returns
    /// * `Some(Arc<Catalog>)` with the removed catalog
    /// * `None` if no catalog has this id
    pub fn remove(&mut self, id: CatalogId) -> Option<Arc<Catalog>> {
        let catalog = self.by_id.remove(&id)?;
        self.by_name.remove(catalog.name());
        Some(catalog)
    }

    /// Iterate over all catalogs in id order
    pub fn all(&self) -> impl Iterator<Item = &Arc<Catalog>> {
        self.by_id.values()
    }

    /// The canonical id index
    pub fn id_index(&self) -> &BTreeMap<CatalogId, Arc<Catalog>> {
        &self.by_id
    }

    /// The internal catalog
    pub fn internal(&self) -> &Arc<Catalog> {
        &self.internal
    }

    /// Number of catalogs, internal included
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Highest catalog id present
    pub fn max_id(&self) -> CatalogId {
        self.by_id
            .keys()
            .next_back()
            .copied()
            .unwrap_or(INTERNAL_CATALOG_ID)
    }

    /// Verify that the two indices describe the same set of catalogs
    ///
    /// Every catalog must be reachable by its id and by its name, through the
    /// same allocation, with no extra entries in either index.
    pub fn check_consistency(&self) -> CatalogResult<()> {
        if self.by_id.len() != self.by_name.len() {
            return Err(CatalogError::ReplayInvariant(format!(
                "index sizes differ: {} by id, {} by name",
                self.by_id.len(),
                self.by_name.len()
            )));
        }
        for (id, catalog) in &self.by_id {
            if *id != catalog.id() {
                return Err(CatalogError::ReplayInvariant(format!(
                    "catalog '{}' stored under id {} but has id {}",
                    catalog.name(),
                    id,
                    catalog.id()
                )));
            }
            match self.by_name.get(catalog.name()) {
                Some(named) if Arc::ptr_eq(named, catalog) => {}
                _ => {
                    return Err(CatalogError::ReplayInvariant(format!(
                        "catalog {} is not reachable by name '{}'",
                        id,
                        catalog.name()
                    )))
                }
            }
        }
        match self.by_id.get(&INTERNAL_CATALOG_ID) {
            Some(internal) if Arc::ptr_eq(internal, &self.internal) => Ok(()),
            _ => Err(CatalogError::ReplayInvariant(
                "internal catalog reference is stale".to_string(),
            )),
        }
    }

    fn link(&mut self, catalog: Arc<Catalog>) {
        self.by_name
            .insert(catalog.name().to_string(), catalog.clone());
        self.by_id.insert(catalog.id(), catalog);
    }
}
