// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog registry

use thiserror::Error;

use crate::editlog::EditLogError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog had already exist with name: {0}")]
    AlreadyExists(String),

    #[error("No catalog found with name: {0}")]
    NotFound(String),

    #[error("Can't modify the type of catalog '{name}' from '{current}' to '{requested}'")]
    ImmutableFieldViolation {
        name: String,
        current: String,
        requested: String,
    },

    #[error("Access denied for user '{user}' to catalog '{catalog}'")]
    AccessDenied { user: String, catalog: String },

    #[error("Edit log append failed: {0}")]
    LogAppendFailure(String),

    #[error("Internal catalog '{name}' cannot be {action}")]
    InternalCatalogProtected { name: String, action: String },

    #[error("Unsupported catalog type: {0}")]
    UnsupportedCatalogType(String),

    #[error("Invalid catalog properties: {0}")]
    InvalidProperties(String),

    #[error("Replay invariant violated: {0}")]
    ReplayInvariant(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// True for errors that come from a replicated entry that cannot be applied
    /// to the current state. These indicate divergence, not a bad request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CatalogError::ReplayInvariant(_) | CatalogError::LogAppendFailure(_)
        )
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CatalogError::Deserialization(err.to_string())
        } else {
            CatalogError::Serialization(err.to_string())
        }
    }
}

impl From<EditLogError> for CatalogError {
    fn from(err: EditLogError) -> Self {
        CatalogError::Io(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
