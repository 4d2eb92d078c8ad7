// Storage Scan Module
//
// The storage-scan collaborator opens a partitioned, column-projected
// collection over one keyspace/table.

pub mod memory;

use crate::collection::PartitionedCollection;
use crate::query::executor::result::QueryResult;

pub use self::memory::MemoryStore;

/// Source of partitioned table scans
pub trait StorageScan: Send + Sync {
    /// Open a collection over `keyspace.table` restricted to `columns`.
    ///
    /// An empty `columns` slice requests every column. An unknown table
    /// fails with `UnresolvedTable`.
    fn scan(&self, keyspace: &str, table: &str, columns: &[String]) -> QueryResult<PartitionedCollection>;
}
