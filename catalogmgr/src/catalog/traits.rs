// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Collaborator traits consumed by the catalog manager
//!
//! The manager never reaches for process-wide singletons. Id allocation,
//! privilege checks and per-source database enumeration are injected through
//! these traits; the durable edit log trait lives in `crate::editlog`.

use super::types::{Catalog, CatalogId, DatabaseId, DatabaseInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-wide monotonic id source
///
/// Called only when a catalog is created. Ids must never be reused.
pub trait IdGenerator: Send + Sync {
    /// Allocate the next id
    fn next_id(&self) -> CatalogId;
}

/// Identity of the caller of a privileged read
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub name: String,
}

impl UserIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Catalog-level privileges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivAction {
    Show,
    Create,
    Alter,
    Drop,
}

impl fmt::Display for PrivAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrivAction::Show => "show",
            PrivAction::Create => "create",
            PrivAction::Alter => "alter",
            PrivAction::Drop => "drop",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for PrivAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "show" => Ok(PrivAction::Show),
            "create" => Ok(PrivAction::Create),
            "alter" => Ok(PrivAction::Alter),
            "drop" => Ok(PrivAction::Drop),
            other => Err(format!("unknown catalog privilege '{}'", other)),
        }
    }
}

/// Answers whether a user may perform an action on a catalog
pub trait PrivilegeChecker: Send + Sync {
    fn check_catalog_priv(&self, user: &UserIdentity, catalog_name: &str, action: PrivAction)
        -> bool;
}

/// Database enumeration for one kind of data source
///
/// One connector serves every catalog of its type; the catalog is passed in so
/// the connector can pick the right remote namespace.
pub trait DataSourceConnector: Send + Sync {
    /// Ids of all databases visible through `catalog`
    fn database_ids(&self, catalog: &Catalog) -> Vec<DatabaseId>;

    /// Names of all databases visible through `catalog`
    fn database_names(&self, catalog: &Catalog) -> Vec<String>;

    /// Resolve one database id within `catalog`
    fn database_by_id(&self, catalog: &Catalog, id: DatabaseId) -> Option<DatabaseInfo>;
}
