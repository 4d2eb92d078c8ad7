// Join Executor
//
// Equality join over the collections of the two children of a join node.
// Both sides are keyed by their join column, joined through the engine,
// and each matched pair is merged into one row.

use std::sync::Arc;

use crate::collection::{PairMerger, PartitionedCollection};
use crate::common::logging::QueryLogger;
use crate::common::types::unqualified;
use crate::query::executor::materialize::{Materialization, ResultMaterializer};
use crate::query::executor::result::{IntermediateResult, NodeResult, QueryError, QueryResult, Row};
use crate::query::statement::{JoinSpec, SelectStatement, Selection};

/// Executes plan nodes with two children
pub struct JoinExecutor<'a> {
    materializer: &'a ResultMaterializer<'a>,
    log: &'a QueryLogger,
}

impl<'a> JoinExecutor<'a> {
    pub fn new(materializer: &'a ResultMaterializer<'a>, log: &'a QueryLogger) -> Self {
        JoinExecutor { materializer, log }
    }

    /// Join the children's collections and materialize the final result.
    ///
    /// A join node is always the plan root, so the result is always final
    /// and never a count.
    pub fn execute(
        &self,
        select: &SelectStatement,
        left: IntermediateResult,
        right: IntermediateResult,
    ) -> QueryResult<NodeResult> {
        let (left_key, right_key) = join_keys(select.join.as_ref())?;
        self.log.debug(format_args!("INNER JOIN on: {} - {}", left_key, right_key));

        let merged = self.join(left.into_collection(), right.into_collection(), &left_key, &right_key);

        let mode = Materialization {
            is_root: true,
            count_only: false,
        };
        self.materializer.materialize(merged, output_columns(&select.selection), mode)
    }

    /// Key both sides, join them and merge every matched pair
    pub fn join(
        &self,
        left: PartitionedCollection,
        right: PartitionedCollection,
        left_key: &str,
        right_key: &str,
    ) -> PartitionedCollection {
        let joined = left.key_by(left_key).join(&right.key_by(right_key));
        let merger: PairMerger = Arc::new(merge_rows);
        let merged = joined.merge(merger);
        self.log.debug(format_args!(
            "collections {} and {} joined into collection {}",
            left.id(),
            right.id(),
            merged.id()
        ));
        merged
    }
}

/// Resolve the key column pair of a join, dropping `table.` qualifiers
fn join_keys(join: Option<&JoinSpec>) -> QueryResult<(String, String)> {
    let join = join.ok_or_else(|| QueryError::JoinKeyMissing("join node has no join clause".to_string()))?;

    let left = unqualified(join.left_column.trim());
    let right = unqualified(join.right_column.trim());
    if left.is_empty() || right.is_empty() {
        return Err(QueryError::JoinKeyMissing(format!(
            "join on {} has no key pair ('{}' = '{}')",
            join.table, join.left_column, join.right_column
        )));
    }
    Ok((left.to_string(), right.to_string()))
}

/// Output columns of the join, without `table.` qualifiers
fn output_columns(selection: &Selection) -> Vec<String> {
    match selection {
        Selection::Fields(fields) => fields.iter().map(|f| unqualified(f).to_string()).collect(),
        Selection::Count => Vec::new(),
    }
}

/// Left columns first, then every right column; on a name clash the right
/// value wins.
fn merge_rows(left: &Row, right: &Row) -> Row {
    let mut merged = left.clone();
    for (column, value) in right.iter() {
        merged.set(column.clone(), value.clone());
    }
    merged
}
