// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! catalogmgr CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    // Determine log level from CLI args or environment variable
    let log_level = if cli.verbose {
        // -v/--verbose flag takes precedence
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // Default to Warn (can still be overridden by RUST_LOG env var)
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Commands::Version = cli.command {
        println!("{} {}", "catalogmgr".bold().green(), catalogmgr::VERSION);
        println!("Data source catalog registry");
        return Ok(());
    }

    let config = cli::load_config(cli.config, cli.meta_dir)?;
    let result = match cli.command {
        Commands::Create {
            name,
            catalog_type,
            properties,
            if_not_exists,
        } => cli::handle_create(&config, name, catalog_type, properties, if_not_exists),

        Commands::Drop { name, if_exists } => cli::handle_drop(&config, name, if_exists),

        Commands::Rename { old_name, new_name } => cli::handle_rename(&config, old_name, new_name),

        Commands::Alter { name, properties } => cli::handle_alter(&config, name, properties),

        Commands::Show { name, format } => cli::handle_show(&config, cli.user, name, format),

        Commands::Checkpoint => cli::handle_checkpoint(&config),

        Commands::Version => Ok(()),
    };

    if let Err(e) = &result {
        eprintln!("{}", format!("Error: {}", e).red());
    }
    result
}
