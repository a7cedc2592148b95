// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// catalogmgr - manage the data source catalogs of a metadata directory
#[derive(Parser, Debug)]
#[command(name = "catalogmgr", version, about, long_about = None)]
pub struct Cli {
    /// Metadata directory (overrides the config file)
    #[arg(long, global = true)]
    pub meta_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    /// User whose privileges apply to SHOW
    #[arg(short, long, global = true, default_value = "admin")]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an external catalog
    Create {
        name: String,

        /// Data source type, e.g. hive or es
        #[arg(long = "type")]
        catalog_type: String,

        /// Connector property, repeatable
        #[arg(short, long = "property", value_parser = parse_property)]
        properties: Vec<(String, String)>,

        #[arg(long)]
        if_not_exists: bool,
    },

    /// Drop a catalog
    Drop {
        name: String,

        #[arg(long)]
        if_exists: bool,
    },

    /// Rename a catalog
    Rename { old_name: String, new_name: String },

    /// Set catalog properties; must repeat the catalog's `type`
    Alter {
        name: String,

        #[arg(short, long = "property", value_parser = parse_property, required = true)]
        properties: Vec<(String, String)>,
    },

    /// List catalogs, or the properties of one catalog
    Show {
        name: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Write a snapshot image and purge covered edit log segments
    Checkpoint,

    /// Print version information
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Parse `key=value`
fn parse_property(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty property key in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
