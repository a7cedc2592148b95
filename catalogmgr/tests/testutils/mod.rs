//! Test utilities for catalogmgr integration tests
//!
//! - CatalogFixture: manager over an in-memory edit log with grants and connectors
//! - DiskFixture: store over a temporary metadata directory

#![allow(dead_code)]

pub mod catalog_fixture;
pub mod disk_fixture;
