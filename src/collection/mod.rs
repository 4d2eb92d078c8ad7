// Partitioned Collection Engine
//
// An in-process engine for immutable, partitioned row collections.
// Transformations only record lineage; actions evaluate partitions on
// scoped worker threads.

pub mod context;
pub mod partitioned;
pub mod keyed;

use std::sync::Arc;

use crate::query::executor::result::Row;

pub use self::context::EngineContext;
pub use self::keyed::{JoinedCollection, KeyedCollection};
pub use self::partitioned::PartitionedCollection;

/// Row test applied by `filter`
pub type RowPredicate = Arc<dyn Fn(&Row) -> bool + Send + Sync>;

/// Combines a matched (left, right) pair into one row
pub type PairMerger = Arc<dyn Fn(&Row, &Row) -> Row + Send + Sync>;
