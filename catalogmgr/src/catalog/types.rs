// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog definitions
//!
//! A catalog is either the built-in internal namespace or an externally
//! configured data source. Both share one record shape so they can live in the
//! same indices and be persisted through the same codec; the `variant` tag and
//! the type string select behavior through the connector dispatch table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Globally unique catalog identifier, assigned once at creation
pub type CatalogId = i64;

/// Identifier of a database owned by some catalog
pub type DatabaseId = i64;

/// Catalog properties. Ordered so snapshots are byte-stable.
pub type CatalogProperties = BTreeMap<String, String>;

/// Reserved id of the internal catalog
pub const INTERNAL_CATALOG_ID: CatalogId = 0;

/// Default display name of the internal catalog
pub const INTERNAL_CATALOG_NAME: &str = "internal";

/// Type tag of the internal catalog, also its key in the connector table
pub const INTERNAL_CATALOG_TYPE: &str = "internal";

/// Property key that mirrors the catalog type
pub const TYPE_PROPERTY: &str = "type";

/// Catalog variant discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogVariant {
    Internal,
    External,
}

impl fmt::Display for CatalogVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CatalogVariant::Internal => "internal",
            CatalogVariant::External => "external",
        };
        write!(f, "{}", s)
    }
}

/// A named, typed data source definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    variant: CatalogVariant,
    id: CatalogId,
    name: String,
    #[serde(rename = "type")]
    catalog_type: String,
    properties: CatalogProperties,
}

impl Catalog {
    /// Build the internal catalog under the reserved id
    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            variant: CatalogVariant::Internal,
            id: INTERNAL_CATALOG_ID,
            name: name.into(),
            catalog_type: INTERNAL_CATALOG_TYPE.to_string(),
            properties: CatalogProperties::new(),
        }
    }

    /// Build an external catalog definition
    ///
    /// The caller is responsible for `properties["type"]` agreeing with
    /// `catalog_type`; see `normalize_create_properties`.
    pub fn external(
        id: CatalogId,
        name: impl Into<String>,
        catalog_type: impl Into<String>,
        properties: CatalogProperties,
    ) -> Self {
        Self {
            variant: CatalogVariant::External,
            id,
            name: name.into(),
            catalog_type: catalog_type.into(),
            properties,
        }
    }

    pub fn id(&self) -> CatalogId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn catalog_type(&self) -> &str {
        &self.catalog_type
    }

    pub fn variant(&self) -> CatalogVariant {
        self.variant
    }

    pub fn is_internal(&self) -> bool {
        self.variant == CatalogVariant::Internal
    }

    pub fn properties(&self) -> &CatalogProperties {
        &self.properties
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Merge new properties over the existing ones. Keys absent from `updates`
    /// are retained and the `type` key always keeps the catalog type.
    pub(crate) fn merge_properties(&mut self, updates: &CatalogProperties) {
        for (key, value) in updates {
            if key == TYPE_PROPERTY {
                continue;
            }
            self.properties.insert(key.clone(), value.clone());
        }
        if self.variant == CatalogVariant::External {
            self.properties
                .insert(TYPE_PROPERTY.to_string(), self.catalog_type.clone());
        }
    }
}

/// Database exposed by a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub id: DatabaseId,
    pub name: String,
}

impl DatabaseInfo {
    pub fn new(id: DatabaseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Fill in or check the `type` property of a catalog about to be created
pub fn normalize_create_properties(
    catalog_type: &str,
    mut properties: CatalogProperties,
) -> Result<CatalogProperties, String> {
    match properties.get(TYPE_PROPERTY) {
        Some(declared) if !declared.eq_ignore_ascii_case(catalog_type) => {
            return Err(format!(
                "property '{}' is '{}' but catalog type is '{}'",
                TYPE_PROPERTY, declared, catalog_type
            ));
        }
        _ => {}
    }
    properties.insert(TYPE_PROPERTY.to_string(), catalog_type.to_string());
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> CatalogProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_internal_catalog_uses_reserved_id() {
        let catalog = Catalog::internal(INTERNAL_CATALOG_NAME);
        assert_eq!(catalog.id(), INTERNAL_CATALOG_ID);
        assert!(catalog.is_internal());
        assert_eq!(catalog.catalog_type(), INTERNAL_CATALOG_TYPE);
    }

    #[test]
    fn test_merge_keeps_unmentioned_keys_and_type() {
        let mut catalog = Catalog::external(
            1000,
            "hive1",
            "hive",
            props(&[("type", "hive"), ("uri", "thrift://a:9083")]),
        );
        catalog.merge_properties(&props(&[("type", "HIVE"), ("user", "etl")]));

        assert_eq!(catalog.properties().get("type").unwrap(), "hive");
        assert_eq!(catalog.properties().get("uri").unwrap(), "thrift://a:9083");
        assert_eq!(catalog.properties().get("user").unwrap(), "etl");
    }

    #[test]
    fn test_normalize_create_properties() {
        let filled = normalize_create_properties("es", props(&[("hosts", "h:9200")])).unwrap();
        assert_eq!(filled.get("type").unwrap(), "es");

        let canonical = normalize_create_properties("hive", props(&[("type", "HIVE")])).unwrap();
        assert_eq!(canonical.get("type").unwrap(), "hive");

        assert!(normalize_create_properties("hive", props(&[("type", "es")])).is_err());
    }
}
