// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog mutation records and outcomes
//!
//! A `CatalogLog` carries everything a node needs to replay one mutation. The
//! same record is applied by the node that originated the change and by every
//! node that receives it through the edit log.

use super::types::{Catalog, CatalogId, CatalogProperties};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog mutation, also the edit log op code
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogOpCode {
    Create = 1,
    Drop = 2,
    AlterName = 3,
    AlterProps = 4,
}

impl CatalogOpCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            1 => Some(CatalogOpCode::Create),
            2 => Some(CatalogOpCode::Drop),
            3 => Some(CatalogOpCode::AlterName),
            4 => Some(CatalogOpCode::AlterProps),
            _ => None,
        }
    }
}

impl fmt::Display for CatalogOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CatalogOpCode::Create => "CREATE",
            CatalogOpCode::Drop => "DROP",
            CatalogOpCode::AlterName => "ALTER_NAME",
            CatalogOpCode::AlterProps => "ALTER_PROPS",
        };
        write!(f, "{}", s)
    }
}

/// Replication record for one catalog mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLog {
    /// Mutation kind
    pub op: CatalogOpCode,
    /// Target catalog id
    pub catalog_id: CatalogId,
    /// New name, ALTER_NAME only
    pub new_name: Option<String>,
    /// Properties to merge, ALTER_PROPS only
    pub new_properties: Option<CatalogProperties>,
    /// Full definition, CREATE only
    pub catalog: Option<Catalog>,
}

impl CatalogLog {
    pub fn create(catalog: Catalog) -> Self {
        Self {
            op: CatalogOpCode::Create,
            catalog_id: catalog.id(),
            new_name: None,
            new_properties: None,
            catalog: Some(catalog),
        }
    }

    pub fn drop(catalog_id: CatalogId) -> Self {
        Self {
            op: CatalogOpCode::Drop,
            catalog_id,
            new_name: None,
            new_properties: None,
            catalog: None,
        }
    }

    pub fn rename(catalog_id: CatalogId, new_name: impl Into<String>) -> Self {
        Self {
            op: CatalogOpCode::AlterName,
            catalog_id,
            new_name: Some(new_name.into()),
            new_properties: None,
            catalog: None,
        }
    }

    pub fn alter_props(catalog_id: CatalogId, new_properties: CatalogProperties) -> Self {
        Self {
            op: CatalogOpCode::AlterProps,
            catalog_id,
            new_name: None,
            new_properties: Some(new_properties),
            catalog: None,
        }
    }
}

/// Result of a mutation request that did not fail
///
/// Keeps a benign no-op apart from an applied change so callers never need to
/// inspect error kinds to learn that nothing happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The mutation was logged and applied
    Applied,
    /// CREATE ... IF NOT EXISTS on a name that is taken
    NoOpAlreadyExists,
    /// DROP ... IF EXISTS on a name that is absent
    NoOpNotFound,
}

impl MutationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}
