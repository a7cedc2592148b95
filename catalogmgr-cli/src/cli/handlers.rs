// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers
//!
//! Each invocation recovers the store from the metadata directory, runs one
//! command and exits. Everything a command changes is in the edit log before
//! the handler returns.

use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use super::commands::OutputFormat;
use super::output::ResultFormatter;
use catalogmgr::{
    AllowAllPrivileges, CatalogConfig, CatalogProperties, CatalogStore, ConnectorRegistry,
    GrantTable, InMemoryConnector, PrivilegeChecker, UserIdentity, INTERNAL_CATALOG_TYPE,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Resolve the configuration from `--config` and `--meta-dir`
pub fn load_config(
    config_path: Option<PathBuf>,
    meta_dir: Option<PathBuf>,
) -> Result<CatalogConfig, Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => CatalogConfig::from_file(path)?,
        None => CatalogConfig::default(),
    };
    if let Some(meta_dir) = meta_dir {
        config.meta_dir = meta_dir;
    }
    Ok(config)
}

/// Recover the store described by `config`
pub fn open_store(config: &CatalogConfig) -> Result<CatalogStore, Box<dyn std::error::Error>> {
    let mut connectors =
        ConnectorRegistry::new().with(INTERNAL_CATALOG_TYPE, Arc::new(InMemoryConnector::new()));
    for catalog_type in &config.catalog_types {
        connectors.register(catalog_type, Arc::new(InMemoryConnector::new()));
    }

    let privileges: Arc<dyn PrivilegeChecker> = if config.grants.is_empty() {
        Arc::new(AllowAllPrivileges)
    } else {
        Arc::new(GrantTable::from_specs(&config.grants))
    };

    let (store, report) = CatalogStore::open(config, connectors, privileges)
        .map_err(|e| format!("Failed to open {}: {}", config.meta_dir.display(), e))?;
    log::debug!("Recovered catalogs: {}", report);
    Ok(store)
}

/// Handle the create command
pub fn handle_create(
    config: &CatalogConfig,
    name: String,
    catalog_type: String,
    properties: Vec<(String, String)>,
    if_not_exists: bool,
) -> CliResult {
    let store = open_store(config)?;
    let properties: CatalogProperties = properties.into_iter().collect();
    let outcome = store
        .manager()
        .create_catalog(&name, &catalog_type, properties, if_not_exists)?;

    println!("{}", ResultFormatter::outcome("Created", &name, outcome));
    if outcome.is_applied() {
        if let Some(catalog) = store.manager().get_catalog(&name) {
            println!("  id: {}", catalog.id());
        }
    }
    Ok(())
}

/// Handle the drop command
pub fn handle_drop(config: &CatalogConfig, name: String, if_exists: bool) -> CliResult {
    let store = open_store(config)?;
    let outcome = store.manager().drop_catalog(&name, if_exists)?;
    println!("{}", ResultFormatter::outcome("Dropped", &name, outcome));
    Ok(())
}

/// Handle the rename command
pub fn handle_rename(config: &CatalogConfig, old_name: String, new_name: String) -> CliResult {
    let store = open_store(config)?;
    store.manager().rename_catalog(&old_name, &new_name)?;
    println!(
        "{}",
        format!("Renamed catalog '{}' to '{}'", old_name, new_name).green()
    );
    Ok(())
}

/// Handle the alter command
pub fn handle_alter(
    config: &CatalogConfig,
    name: String,
    properties: Vec<(String, String)>,
) -> CliResult {
    let store = open_store(config)?;
    let properties: CatalogProperties = properties.into_iter().collect();
    let outcome = store.manager().alter_catalog_properties(&name, properties)?;
    println!("{}", ResultFormatter::outcome("Altered", &name, outcome));
    Ok(())
}

/// Handle the show command
pub fn handle_show(
    config: &CatalogConfig,
    user: String,
    name: Option<String>,
    format: OutputFormat,
) -> CliResult {
    let store = open_store(config)?;
    let result = store
        .manager()
        .show_catalogs(&UserIdentity::new(user), name.as_deref())?;
    println!("{}", ResultFormatter::format(&result, format));
    Ok(())
}

/// Handle the checkpoint command
pub fn handle_checkpoint(config: &CatalogConfig) -> CliResult {
    let store = open_store(config)?;
    let report = store.checkpoint()?;
    println!(
        "{}",
        format!(
            "Checkpoint at sequence {} written to {}",
            report.sequence,
            report.image_path.display()
        )
        .green()
    );
    println!("  purged edit log segments: {}", report.purged_segments);
    Ok(())
}
