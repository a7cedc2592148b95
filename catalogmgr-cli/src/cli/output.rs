// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use catalogmgr::{MutationOutcome, ShowResultSet};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use super::commands::OutputFormat;

/// Result formatter for different output formats
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format a SHOW result in the specified format
    pub fn format(result: &ShowResultSet, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => Self::format_table(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Format results as a table using comfy-table
    fn format_table(result: &ShowResultSet) -> String {
        if result.is_empty() {
            return format!("{}\n", "No catalogs found".yellow());
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(
            result
                .columns
                .iter()
                .map(|col| Cell::new(col).fg(Color::Green))
                .collect::<Vec<_>>(),
        );
        for row in &result.rows {
            table.add_row(row.clone());
        }

        format!("{}\n{} rows\n", table, result.len())
    }

    /// Format results as JSON, one object per row keyed by column
    fn format_json(result: &ShowResultSet) -> String {
        let rows: Vec<serde_json::Value> = result
            .rows
            .iter()
            .map(|row| {
                let mut row_map = serde_json::Map::new();
                for (col, value) in result.columns.iter().zip(row) {
                    row_map.insert(col.clone(), serde_json::Value::String(value.clone()));
                }
                serde_json::Value::Object(row_map)
            })
            .collect();

        let json_result = serde_json::json!({
            "status": "success",
            "columns": result.columns,
            "rows": rows,
        });
        serde_json::to_string_pretty(&json_result).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize results to JSON\"}".to_string()
        })
    }

    /// One-line summary of a mutation
    pub fn outcome(action: &str, name: &str, outcome: MutationOutcome) -> String {
        match outcome {
            MutationOutcome::Applied => format!("{} catalog '{}'", action, name).green().to_string(),
            MutationOutcome::NoOpAlreadyExists => {
                format!("Catalog '{}' already exists, nothing to do", name)
                    .yellow()
                    .to_string()
            }
            MutationOutcome::NoOpNotFound => format!("Catalog '{}' not found, nothing to do", name)
                .yellow()
                .to_string(),
        }
    }
}
