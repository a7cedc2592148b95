// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! catalogmgr - Catalog (data source) registry for a distributed analytical database
//!
//! The registry is the authoritative in-memory definition of every data source
//! a node can query. All mutations go through one single-writer protocol that
//! appends a replayable entry to the edit log before changing memory, so the
//! node that originates a change and every node that replays it converge on
//! the same state.
//!
//! # Usage
//!
//! ```ignore
//! use catalogmgr::{CatalogConfig, CatalogStore, ConnectorRegistry, AllowAllPrivileges};
//!
//! let config = CatalogConfig::with_meta_dir("./catalog-meta");
//! let (store, report) = CatalogStore::open(&config, ConnectorRegistry::new(), Arc::new(AllowAllPrivileges))?;
//! store.manager().create_catalog("hive1", "hive", props, false)?;
//! ```

pub mod catalog;
pub mod config;
pub mod editlog;

pub use catalog::{
    AllowAllPrivileges, Catalog, CatalogError, CatalogId, CatalogLog, CatalogManager,
    CatalogOpCode, CatalogProperties, CatalogRegistry, CatalogResult, CatalogStore,
    CatalogVariant, CheckpointReport, Collaborators, ConnectorRegistry, DataSourceConnector,
    DatabaseId, DatabaseInfo, GrantSpec, GrantTable, IdGenerator, ImageStore, InMemoryConnector,
    MonotonicIdGenerator, MutationOutcome, PrivAction, PrivilegeChecker, RecoveryReport,
    ShowResultSet, UserIdentity, INTERNAL_CATALOG_ID, INTERNAL_CATALOG_NAME, INTERNAL_CATALOG_TYPE,
};
pub use config::CatalogConfig;
pub use editlog::{EditLog, EditLogEntry, EditLogError, FileEditLog, MemoryEditLog};

/// catalogmgr version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// catalogmgr crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
