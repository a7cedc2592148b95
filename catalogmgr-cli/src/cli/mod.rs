// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for catalogmgr
//!
//! Provides the one-shot commands that create, drop, rename, alter and show
//! catalogs in a metadata directory.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_alter, handle_checkpoint, handle_create, handle_drop, handle_rename, handle_show,
    load_config,
};
