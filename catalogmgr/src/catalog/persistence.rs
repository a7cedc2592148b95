// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Snapshot codec
//!
//! Only the id index is written. Each record carries its `variant` tag and is
//! checked against it on load; the name index and the internal catalog
//! reference are rebuilt from the decoded id index.
//!
//! Snapshot format (JSON):
//! ```json
//! { "idToCatalog": { "0": { "variant": "Internal", "id": 0, "name": "internal",
//!                           "type": "internal", "properties": {} } } }
//! ```

use super::error::{CatalogError, CatalogResult};
use super::registry::CatalogRegistry;
use super::types::{Catalog, CatalogId, CatalogVariant, INTERNAL_CATALOG_ID, TYPE_PROPERTY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    #[serde(rename = "idToCatalog")]
    id_to_catalog: BTreeMap<CatalogId, &'a Catalog>,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    #[serde(rename = "idToCatalog")]
    id_to_catalog: BTreeMap<CatalogId, Catalog>,
}

/// Serialize the registry's id index
pub fn serialize(registry: &CatalogRegistry) -> CatalogResult<Vec<u8>> {
    let snapshot = SnapshotRef {
        id_to_catalog: registry
            .id_index()
            .iter()
            .map(|(id, catalog)| (*id, catalog.as_ref()))
            .collect(),
    };
    let bytes = serde_json::to_vec(&snapshot)
        .map_err(|e| CatalogError::Serialization(format!("catalog snapshot: {}", e)))?;
    log::debug!(
        "Serialized {} catalogs into {} bytes",
        registry.len(),
        bytes.len()
    );
    Ok(bytes)
}

/// Rebuild a registry from snapshot bytes
pub fn deserialize(bytes: &[u8]) -> CatalogResult<CatalogRegistry> {
    let snapshot: SnapshotOwned = serde_json::from_slice(bytes)
        .map_err(|e| CatalogError::Deserialization(format!("catalog snapshot: {}", e)))?;

    let mut by_id = BTreeMap::new();
    for (key, catalog) in snapshot.id_to_catalog {
        check_record(key, &catalog)?;
        by_id.insert(key, Arc::new(catalog));
    }

    let registry = CatalogRegistry::from_id_index(by_id)?;
    log::debug!("Deserialized {} catalogs", registry.len());
    Ok(registry)
}

/// Variant-aware validation of one decoded record
fn check_record(key: CatalogId, catalog: &Catalog) -> CatalogResult<()> {
    if key != catalog.id() {
        return Err(CatalogError::Deserialization(format!(
            "catalog '{}' keyed by {} but has id {}",
            catalog.name(),
            key,
            catalog.id()
        )));
    }
    match catalog.variant() {
        CatalogVariant::Internal if catalog.id() != INTERNAL_CATALOG_ID => {
            Err(CatalogError::Deserialization(format!(
                "internal catalog record has id {}, expected {}",
                catalog.id(),
                INTERNAL_CATALOG_ID
            )))
        }
        CatalogVariant::External if catalog.id() == INTERNAL_CATALOG_ID => {
            Err(CatalogError::Deserialization(format!(
                "external catalog '{}' uses the reserved id {}",
                catalog.name(),
                INTERNAL_CATALOG_ID
            )))
        }
        CatalogVariant::External
            if catalog.properties().get(TYPE_PROPERTY).map(String::as_str)
                != Some(catalog.catalog_type()) =>
        {
            Err(CatalogError::Deserialization(format!(
                "external catalog '{}' has a type property that differs from '{}'",
                catalog.name(),
                catalog.catalog_type()
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::types::{CatalogProperties, INTERNAL_CATALOG_NAME};

    fn sample_registry() -> CatalogRegistry {
        let mut registry = CatalogRegistry::new(INTERNAL_CATALOG_NAME);
        for (id, name, kind) in [(1000, "hive1", "hive"), (1001, "es1", "es")] {
            let mut props = CatalogProperties::new();
            props.insert("type".to_string(), kind.to_string());
            props.insert("owner".to_string(), "etl".to_string());
            registry.insert(Catalog::external(id, name, kind, props));
        }
        registry
    }

    #[test]
    fn test_round_trip_rebuilds_indices() {
        let registry = sample_registry();
        let restored = deserialize(&serialize(&registry).unwrap()).unwrap();

        assert_eq!(restored.len(), 3);
        assert_eq!(restored.by_name("es1").unwrap().id(), 1001);
        assert_eq!(restored.internal().id(), INTERNAL_CATALOG_ID);
        assert!(restored.check_consistency().is_ok());
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let first = serialize(&sample_registry()).unwrap();
        let second = serialize(&deserialize(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_snapshot_has_only_id_index() {
        let bytes = serialize(&sample_registry()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 1);
        let record = &object["idToCatalog"]["1000"];
        assert_eq!(record["variant"], "External");
        assert_eq!(record["type"], "hive");
        assert_eq!(record["name"], "hive1");
    }

    #[test]
    fn test_rejects_mismatched_variant() {
        let bad = br#"{"idToCatalog":{
            "0":{"variant":"Internal","id":0,"name":"internal","type":"internal","properties":{}},
            "7":{"variant":"Internal","id":7,"name":"x","type":"internal","properties":{}}}}"#;
        assert!(matches!(
            deserialize(bad),
            Err(CatalogError::Deserialization(_))
        ));
    }

    #[test]
    fn test_rejects_missing_internal_catalog() {
        let bad = br#"{"idToCatalog":{
            "1000":{"variant":"External","id":1000,"name":"h","type":"hive","properties":{"type":"hive"}}}}"#;
        assert!(deserialize(bad).is_err());
    }
}
