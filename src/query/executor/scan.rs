// Leaf Scan Executor
//
// Runs a single-table SELECT: opens a projected scan, applies the WHERE
// relations as chained filters and hands the collection to the
// materializer.

use crate::collection::RowPredicate;
use crate::common::logging::QueryLogger;
use crate::common::types::unqualified;
use crate::query::executor::materialize::{Materialization, ResultMaterializer};
use crate::query::executor::predicate::compile_relation;
use crate::query::executor::result::{NodeResult, QueryResult};
use crate::query::statement::{SelectStatement, Selection};
use crate::storage::StorageScan;

/// Executes plan nodes without children
pub struct LeafScanExecutor<'a> {
    storage: &'a dyn StorageScan,
    materializer: &'a ResultMaterializer<'a>,
    log: &'a QueryLogger,
}

impl<'a> LeafScanExecutor<'a> {
    pub fn new(storage: &'a dyn StorageScan, materializer: &'a ResultMaterializer<'a>, log: &'a QueryLogger) -> Self {
        LeafScanExecutor {
            storage,
            materializer,
            log,
        }
    }

    /// Scan, filter and materialize one table
    pub fn execute(&self, select: &SelectStatement, is_root: bool) -> QueryResult<NodeResult> {
        let columns = projection(&select.selection);

        // Every relation must compile before the scan is opened
        let predicates = select
            .where_clause
            .iter()
            .map(|relation| {
                compile_relation(relation).inspect_err(|e| {
                    self.log.error(format_args!("{} in relation '{}'", e, relation));
                })
            })
            .collect::<QueryResult<Vec<RowPredicate>>>()?;

        // Predicate columns are read even when the projection leaves them out
        let scan_columns = scan_columns(&columns, select);
        let mut collection = self.storage.scan(&select.keyspace, &select.table, &scan_columns)?;
        self.log.debug(format_args!(
            "scan {}.{} opened as collection {} ({} partitions, {} predicates)",
            select.keyspace,
            select.table,
            collection.id(),
            collection.num_partitions(),
            predicates.len()
        ));

        for predicate in predicates {
            collection = collection.filter(predicate);
        }
        if scan_columns.len() > columns.len() {
            collection = collection.project(columns.clone());
        }

        let mode = Materialization {
            is_root,
            count_only: select.selection.is_count(),
        };
        self.materializer.materialize(collection, columns, mode)
    }
}

/// Column names requested from storage; empty means every column
fn projection(selection: &Selection) -> Vec<String> {
    match selection {
        Selection::Fields(fields) => fields.iter().map(|f| unqualified(f).to_string()).collect(),
        Selection::Count => Vec::new(),
    }
}

/// Projection plus every column a relation reads, or empty for all columns
fn scan_columns(columns: &[String], select: &SelectStatement) -> Vec<String> {
    if columns.is_empty() {
        return Vec::new();
    }

    let mut scanned = columns.to_vec();
    for relation in &select.where_clause {
        let column = unqualified(&relation.identifier);
        if !scanned.iter().any(|c| c == column) {
            scanned.push(column.to_string());
        }
    }
    scanned
}
