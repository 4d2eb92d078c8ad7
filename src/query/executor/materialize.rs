// Result Materializer
//
// Turns a partitioned collection into the result a plan node hands back:
// a bounded row set or a count at the root, an intermediate artifact
// anywhere else.

use crate::collection::PartitionedCollection;
use crate::common::logging::QueryLogger;
use crate::query::executor::result::{IntermediateResult, NodeResult, QueryResult, QueryResultSet, Row};

/// How a node's collection is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Materialization {
    /// The node is the root of the plan
    pub is_root: bool,
    /// Only the row count is requested
    pub count_only: bool,
}

/// Builds node results from partitioned collections
pub struct ResultMaterializer<'a> {
    /// Maximum number of rows pulled for a root result
    result_limit: usize,
    log: &'a QueryLogger,
}

impl<'a> ResultMaterializer<'a> {
    pub fn new(result_limit: usize, log: &'a QueryLogger) -> Self {
        ResultMaterializer { result_limit, log }
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// Materialize `collection` whose schema is described by `columns`
    pub fn materialize(
        &self,
        collection: PartitionedCollection,
        columns: Vec<String>,
        mode: Materialization,
    ) -> QueryResult<NodeResult> {
        if !mode.is_root {
            self.log.info(format_args!(
                "intermediate collection {} with {} partitions handed to parent",
                collection.id(),
                collection.num_partitions()
            ));
            return Ok(NodeResult::Intermediate(IntermediateResult::new(collection, columns)));
        }

        if mode.count_only {
            let count = collection.count()?;
            self.log.debug(format_args!("collection {} counted {} rows", collection.id(), count));
            return Ok(NodeResult::Final(QueryResultSet::from_count(count)));
        }

        // One row past the bound tells a full result from a truncated one
        let mut rows = collection.take(self.result_limit.saturating_add(1))?;
        if rows.len() > self.result_limit {
            rows.truncate(self.result_limit);
            self.log.debug(format_args!(
                "result of collection {} truncated to {} rows",
                collection.id(),
                self.result_limit
            ));
        }

        if columns.is_empty() {
            let columns = columns_of(&rows);
            return Ok(NodeResult::Final(QueryResultSet::from_rows(columns, rows)));
        }

        let rows = rows.iter().map(|row| row.project(&columns)).collect();
        Ok(NodeResult::Final(QueryResultSet::from_rows(columns, rows)))
    }
}

/// Column list of an unrestricted projection, taken from the first row
fn columns_of(rows: &[Row]) -> Vec<String> {
    rows.first().map(|row| row.columns()).unwrap_or_default()
}
