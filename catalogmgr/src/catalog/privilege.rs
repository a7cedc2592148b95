// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Bundled privilege checkers

use super::traits::{PrivAction, PrivilegeChecker, UserIdentity};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Catalog name that matches every catalog in a grant
pub const ANY_CATALOG: &str = "*";

/// Name of the user that bypasses grant checks
pub const ADMIN_USER: &str = "admin";

/// Grants every privilege to everyone
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllPrivileges;

impl PrivilegeChecker for AllowAllPrivileges {
    fn check_catalog_priv(&self, _user: &UserIdentity, _catalog: &str, _action: PrivAction) -> bool {
        true
    }
}

/// One configured grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSpec {
    pub user: String,
    /// Catalog name, or `*` for all catalogs
    pub catalog: String,
    pub actions: Vec<PrivAction>,
}

/// Explicit (user, catalog, action) grants
#[derive(Debug, Default)]
pub struct GrantTable {
    grants: RwLock<HashMap<String, HashMap<String, HashSet<PrivAction>>>>,
}

impl GrantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[GrantSpec]) -> Self {
        let table = Self::new();
        for spec in specs {
            for action in &spec.actions {
                table.grant(&spec.user, &spec.catalog, *action);
            }
        }
        table
    }

    pub fn grant(&self, user: &str, catalog: &str, action: PrivAction) {
        self.grants
            .write()
            .entry(user.to_string())
            .or_default()
            .entry(catalog.to_string())
            .or_default()
            .insert(action);
    }

    pub fn revoke(&self, user: &str, catalog: &str, action: PrivAction) {
        if let Some(catalogs) = self.grants.write().get_mut(user) {
            if let Some(actions) = catalogs.get_mut(catalog) {
                actions.remove(&action);
            }
        }
    }
}

impl PrivilegeChecker for GrantTable {
    fn check_catalog_priv(&self, user: &UserIdentity, catalog: &str, action: PrivAction) -> bool {
        if user.name == ADMIN_USER {
            return true;
        }
        let grants = self.grants.read();
        let Some(catalogs) = grants.get(&user.name) else {
            return false;
        };
        [catalog, ANY_CATALOG].iter().any(|name| {
            catalogs
                .get(*name)
                .map(|actions| actions.contains(&action))
                .unwrap_or(false)
        })
    }
}
