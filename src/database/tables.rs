//! The inferred table catalog.
//!
//! Tables are keyed by canonical lowercase name. Every record operation looks
//! the canonical name up before inserting, so a table first seen via a query
//! and later via a model declaration collapses into one entry.

use std::collections::BTreeMap;
use std::path::Path;

use super::models::{MigrationColumn, ModelHit};
use crate::core::{ColumnHint, QueryOccurrence, Table};

#[derive(Debug, Default)]
pub struct TableCatalog {
    tables: BTreeMap<String, Table>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut Table {
        let canonical = name.to_lowercase();
        self.tables
            .entry(canonical.clone())
            .or_insert_with(|| Table {
                name: canonical,
                columns: Vec::new(),
                relationships: Vec::new(),
                model_class: None,
                referenced_by: Default::default(),
            })
    }

    pub fn record_query(&mut self, occurrence: &QueryOccurrence) {
        if let Some(table) = &occurrence.table {
            let file = occurrence.file.clone();
            self.entry(table).referenced_by.insert(file);
        }
    }

    pub fn record_model(&mut self, hit: &ModelHit, file: &Path) {
        let table = self.entry(&hit.table);
        table.model_class = Some(hit.class.clone());
        table.referenced_by.insert(file.to_path_buf());
        for column in &hit.columns {
            push_column(table, column.clone());
        }
        for rel in &hit.relationships {
            if !table.relationships.contains(rel) {
                table.relationships.push(rel.clone());
            }
        }
    }

    pub fn record_migration_column(&mut self, column: &MigrationColumn, file: &Path) {
        let table = self.entry(&column.table);
        table.referenced_by.insert(file.to_path_buf());
        push_column(
            table,
            ColumnHint {
                name: column.name.clone(),
                data_type: Some(column.data_type.clone()),
            },
        );
    }

    /// Consume the catalog in deterministic (name) order.
    pub fn into_tables(self) -> Vec<Table> {
        self.tables.into_values().collect()
    }
}

fn push_column(table: &mut Table, column: ColumnHint) {
    match table.columns.iter_mut().find(|c| c.name == column.name) {
        Some(existing) => {
            // A typed hint refines an untyped one.
            if existing.data_type.is_none() {
                existing.data_type = column.data_type;
            }
        }
        None => table.columns.push(column),
    }
}
