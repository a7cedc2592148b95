// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Replay engine
//!
//! Pure state transitions from a `CatalogLog` to a mutated registry. The node
//! that originates a mutation and every node replaying the edit log run exactly
//! these functions, which is what keeps them convergent.
//!
//! Each transition first runs `validate`, so an entry that does not fit the
//! current state is rejected with `ReplayInvariant` before anything changes.

use super::error::{CatalogError, CatalogResult};
use super::operations::{CatalogLog, CatalogOpCode};
use super::registry::CatalogRegistry;
use super::types::{CatalogId, CatalogVariant, INTERNAL_CATALOG_ID, TYPE_PROPERTY};

/// Apply any catalog log entry, dispatching on its op code
pub fn apply(registry: &mut CatalogRegistry, log: &CatalogLog) -> CatalogResult<()> {
    match log.op {
        CatalogOpCode::Create => apply_create(registry, log),
        CatalogOpCode::Drop => apply_drop(registry, log),
        CatalogOpCode::AlterName => apply_rename(registry, log),
        CatalogOpCode::AlterProps => apply_alter_props(registry, log),
    }
}

/// Check that `log` can be applied to `registry` without violating an index
/// invariant. Does not mutate.
pub fn validate(registry: &CatalogRegistry, log: &CatalogLog) -> CatalogResult<()> {
    if log.op != CatalogOpCode::Create && log.catalog_id == INTERNAL_CATALOG_ID {
        return Err(invariant(log, "entry targets the internal catalog"));
    }

    match log.op {
        CatalogOpCode::Create => {
            let catalog = log
                .catalog
                .as_ref()
                .ok_or_else(|| invariant(log, "missing catalog definition"))?;
            if catalog.id() != log.catalog_id {
                return Err(invariant(log, "definition id does not match entry id"));
            }
            if catalog.variant() != CatalogVariant::External {
                return Err(invariant(log, "only external catalogs are created by log"));
            }
            if registry.by_id(catalog.id()).is_some() {
                return Err(invariant(log, "catalog id already exists"));
            }
            if registry.by_name(catalog.name()).is_some() {
                return Err(invariant(
                    log,
                    &format!("catalog name '{}' already exists", catalog.name()),
                ));
            }
            match catalog.properties().get(TYPE_PROPERTY) {
                Some(declared) if declared == catalog.catalog_type() => Ok(()),
                _ => Err(invariant(log, "type property does not match catalog type")),
            }
        }
        CatalogOpCode::Drop => {
            require_existing(registry, log)?;
            Ok(())
        }
        CatalogOpCode::AlterName => {
            let current = require_existing(registry, log)?;
            let new_name = log
                .new_name
                .as_deref()
                .ok_or_else(|| invariant(log, "missing new name"))?;
            match registry.by_name(new_name) {
                Some(holder) if holder.id() != current => Err(invariant(
                    log,
                    &format!("name '{}' held by catalog {}", new_name, holder.id()),
                )),
                _ => Ok(()),
            }
        }
        CatalogOpCode::AlterProps => {
            require_existing(registry, log)?;
            if log.new_properties.is_none() {
                return Err(invariant(log, "missing new properties"));
            }
            Ok(())
        }
    }
}

/// Insert the catalog carried by a CREATE entry
pub fn apply_create(registry: &mut CatalogRegistry, log: &CatalogLog) -> CatalogResult<()> {
    expect_op(log, CatalogOpCode::Create)?;
    validate(registry, log)?;
    let catalog = log
        .catalog
        .clone()
        .ok_or_else(|| invariant(log, "missing catalog definition"))?;
    log::debug!(
        "Replaying create of catalog '{}' (id {})",
        catalog.name(),
        catalog.id()
    );
    registry.insert(catalog);
    Ok(())
}

/// Remove the catalog named by a DROP entry from both indices
pub fn apply_drop(registry: &mut CatalogRegistry, log: &CatalogLog) -> CatalogResult<()> {
    expect_op(log, CatalogOpCode::Drop)?;
    validate(registry, log)?;
    let removed = registry
        .remove(log.catalog_id)
        .ok_or_else(|| invariant(log, "catalog id not found"))?;
    log::debug!(
        "Replaying drop of catalog '{}' (id {})",
        removed.name(),
        removed.id()
    );
    Ok(())
}

/// Move a catalog to its new name. The old key is removed before the new one
/// is inserted and the id is preserved.
pub fn apply_rename(registry: &mut CatalogRegistry, log: &CatalogLog) -> CatalogResult<()> {
    expect_op(log, CatalogOpCode::AlterName)?;
    validate(registry, log)?;
    let new_name = log
        .new_name
        .clone()
        .ok_or_else(|| invariant(log, "missing new name"))?;
    let removed = registry
        .remove(log.catalog_id)
        .ok_or_else(|| invariant(log, "catalog id not found"))?;

    let mut renamed = (*removed).clone();
    log::debug!(
        "Replaying rename of catalog {} from '{}' to '{}'",
        renamed.id(),
        renamed.name(),
        new_name
    );
    renamed.set_name(new_name);
    registry.insert(renamed);
    Ok(())
}

/// Merge the entry's properties into the catalog's existing properties
pub fn apply_alter_props(registry: &mut CatalogRegistry, log: &CatalogLog) -> CatalogResult<()> {
    expect_op(log, CatalogOpCode::AlterProps)?;
    validate(registry, log)?;
    let updates = log
        .new_properties
        .as_ref()
        .ok_or_else(|| invariant(log, "missing new properties"))?;
    let current = registry
        .remove(log.catalog_id)
        .ok_or_else(|| invariant(log, "catalog id not found"))?;

    let mut altered = (*current).clone();
    altered.merge_properties(updates);
    log::debug!(
        "Replaying property change on catalog '{}' ({} keys)",
        altered.name(),
        updates.len()
    );
    registry.insert(altered);
    Ok(())
}

fn require_existing(registry: &CatalogRegistry, log: &CatalogLog) -> CatalogResult<CatalogId> {
    registry
        .by_id(log.catalog_id)
        .map(|catalog| catalog.id())
        .ok_or_else(|| invariant(log, "catalog id not found"))
}

fn expect_op(log: &CatalogLog, op: CatalogOpCode) -> CatalogResult<()> {
    if log.op == op {
        Ok(())
    } else {
        Err(invariant(log, &format!("expected {} entry", op)))
    }
}

fn invariant(log: &CatalogLog, detail: &str) -> CatalogError {
    CatalogError::ReplayInvariant(format!(
        "{} entry for catalog {}: {}",
        log.op, log.catalog_id, detail
    ))
}
