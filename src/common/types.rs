/// Default maximum number of rows pulled into a root result set
pub const DEFAULT_RESULT_SIZE: usize = 100_000;

/// Default number of partitions a scan is split into
pub const DEFAULT_PARTITIONS: usize = 4;

/// Column name of a count-only result
pub const COUNT_COLUMN: &str = "COUNT";

/// Column name of the explanatory result returned for rejected statements
pub const RESULT_COLUMN: &str = "RESULT";

/// Partitioned collection ID type
pub type CollectionId = u64;

/// Partition index type
pub type PartitionId = usize;

/// Strip the qualifiers from a column identifier.
///
/// The column is the part after the last dot, so `users.id` and
/// `shop.users.id` both become `id`. An unqualified name is returned as-is.
pub fn unqualified(identifier: &str) -> &str {
    match identifier.rsplit_once('.') {
        Some((_, column)) => column,
        None => identifier,
    }
}
