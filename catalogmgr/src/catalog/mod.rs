// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog registry
//!
//! Holds every named data source (the built-in internal catalog plus the
//! externally configured ones) in two indices, by id and by name, and keeps
//! replicas convergent by recording each mutation as a replayable entry.
//! Source-specific behavior is looked up by type tag in the connector table.

// Core catalog system exports
pub mod connectors;
pub mod error;
pub mod idgen;
pub mod manager;
pub mod operations;
pub mod persistence;
pub mod privilege;
pub mod query;
pub mod recovery;
pub mod registry;
pub mod replay;
pub mod traits;
pub mod types;

pub use connectors::{ConnectorRegistry, InMemoryConnector};
pub use error::{CatalogError, CatalogResult};
pub use idgen::MonotonicIdGenerator;
pub use manager::{CatalogManager, Collaborators};
pub use operations::{CatalogLog, CatalogOpCode, MutationOutcome};
pub use privilege::{AllowAllPrivileges, GrantSpec, GrantTable};
pub use query::ShowResultSet;
pub use recovery::{CatalogStore, CheckpointReport, ImageStore, RecoveryReport};
pub use registry::CatalogRegistry;
pub use traits::{DataSourceConnector, IdGenerator, PrivAction, PrivilegeChecker, UserIdentity};
pub use types::{
    Catalog, CatalogId, CatalogProperties, CatalogVariant, DatabaseId, DatabaseInfo,
    INTERNAL_CATALOG_ID, INTERNAL_CATALOG_NAME, INTERNAL_CATALOG_TYPE,
};
