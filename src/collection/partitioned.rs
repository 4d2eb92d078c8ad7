// Partitioned Collection
//
// Immutable, lazily evaluated sequence of rows spread across partitions.

use std::fmt;
use std::sync::Arc;

use crate::common::types::{CollectionId, PartitionId};
use crate::query::executor::result::{QueryError, QueryResult, Row};

use super::context::{next_collection_id, EngineContext};
use super::keyed::{JoinedCollection, KeyedCollection};
use super::{PairMerger, RowPredicate};

/// How a collection's partitions are derived
enum Lineage {
    /// Rows handed to the engine directly
    Source { partitions: Vec<Vec<Row>> },
    /// Rows of the parent that satisfy the predicate
    Filter { parent: PartitionedCollection, predicate: RowPredicate },
    /// Matched pairs of a keyed join combined into single rows
    Merge { joined: JoinedCollection, merger: PairMerger },
    /// Rows of the parent narrowed to a column list
    Project { parent: PartitionedCollection, columns: Vec<String> },
}

impl Lineage {
    fn name(&self) -> &'static str {
        match self {
            Lineage::Source { .. } => "Source",
            Lineage::Filter { .. } => "Filter",
            Lineage::Merge { .. } => "Merge",
            Lineage::Project { .. } => "Project",
        }
    }
}

/// Handle to a partitioned collection.
///
/// Cloning the handle shares the same lineage; every transformation
/// returns a new collection and leaves its input untouched.
#[derive(Clone)]
pub struct PartitionedCollection {
    id: CollectionId,
    context: EngineContext,
    lineage: Arc<Lineage>,
}

impl fmt::Debug for PartitionedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartitionedCollection")
            .field("id", &self.id)
            .field("lineage", &self.lineage.name())
            .field("partitions", &self.num_partitions())
            .finish()
    }
}

impl PartitionedCollection {
    pub(crate) fn from_partitions(context: EngineContext, partitions: Vec<Vec<Row>>) -> Self {
        Self::with_lineage(context, Lineage::Source { partitions })
    }

    pub(crate) fn merged(joined: JoinedCollection, merger: PairMerger) -> Self {
        let context = joined.context().clone();
        Self::with_lineage(context, Lineage::Merge { joined, merger })
    }

    fn with_lineage(context: EngineContext, lineage: Lineage) -> Self {
        PartitionedCollection {
            id: next_collection_id(),
            context,
            lineage: Arc::new(lineage),
        }
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn num_partitions(&self) -> usize {
        match self.lineage.as_ref() {
            Lineage::Source { partitions } => partitions.len(),
            Lineage::Filter { parent, .. } => parent.num_partitions(),
            Lineage::Merge { joined, .. } => joined.num_partitions(),
            Lineage::Project { parent, .. } => parent.num_partitions(),
        }
    }

    /// Keep only the rows for which `predicate` holds
    pub fn filter(&self, predicate: RowPredicate) -> PartitionedCollection {
        Self::with_lineage(
            self.context.clone(),
            Lineage::Filter {
                parent: self.clone(),
                predicate,
            },
        )
    }

    /// Keep only `columns` of every row, in that order
    pub fn project(&self, columns: Vec<String>) -> PartitionedCollection {
        Self::with_lineage(
            self.context.clone(),
            Lineage::Project {
                parent: self.clone(),
                columns,
            },
        )
    }

    /// Re-key every row by the value of `column`
    pub fn key_by(&self, column: impl Into<String>) -> KeyedCollection {
        KeyedCollection::new(self.clone(), column.into())
    }

    /// Evaluate one partition of this collection
    pub(crate) fn compute_partition(&self, partition: PartitionId) -> QueryResult<Vec<Row>> {
        match self.lineage.as_ref() {
            Lineage::Source { partitions } => partitions.get(partition).cloned().ok_or_else(|| {
                QueryError::EngineFailure(format!(
                    "collection {} has no partition {}",
                    self.id, partition
                ))
            }),
            Lineage::Filter { parent, predicate } => Ok(parent
                .compute_partition(partition)?
                .into_iter()
                .filter(|row| predicate(row))
                .collect()),
            Lineage::Merge { joined, merger } => Ok(joined
                .partition_pairs(partition)?
                .iter()
                .map(|(left, right)| merger(left, right))
                .collect()),
            Lineage::Project { parent, columns } => Ok(parent
                .compute_partition(partition)?
                .iter()
                .map(|row| row.project(columns))
                .collect()),
        }
    }

    /// Total number of rows across all partitions.
    ///
    /// Each worker counts its own partitions; rows never leave the workers.
    pub fn count(&self) -> QueryResult<u64> {
        let counts = self
            .context
            .run_partitions(self.num_partitions(), |partition| {
                self.compute_partition(partition).map(|rows| rows.len() as u64)
            })?;
        Ok(counts.into_iter().sum())
    }

    /// Pull at most `limit` rows, in partition order.
    ///
    /// Partitions are evaluated in waves of `parallelism` and scanning stops
    /// once enough rows have been gathered.
    pub fn take(&self, limit: usize) -> QueryResult<Vec<Row>> {
        let mut rows = Vec::new();
        if limit == 0 {
            return Ok(rows);
        }

        let total = self.num_partitions();
        let mut next = 0;
        while next < total && rows.len() < limit {
            let wave = (total - next).min(self.context.parallelism());
            let batch = self
                .context
                .run_partitions(wave, |offset| self.compute_partition(next + offset))?;

            for partition in batch {
                let remaining = limit - rows.len();
                rows.extend(partition.into_iter().take(remaining));
                if rows.len() == limit {
                    break;
                }
            }
            next += wave;
        }

        Ok(rows)
    }

    /// Pull every row, in partition order
    pub fn collect(&self) -> QueryResult<Vec<Row>> {
        self.take(usize::MAX)
    }
}
