// Keyed Collections and Equality Join
//
// A keyed collection pairs every row with the value of one column. Two
// keyed collections join through a single hash shuffle: both sides are
// bucketed by key hash, then each bucket is joined on its own worker.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::common::types::PartitionId;
use crate::query::executor::result::{float_bits, DataValue, QueryError, QueryResult, Row};

use super::PairMerger;
use super::context::EngineContext;
use super::partitioned::PartitionedCollection;

type KeyedBuckets = Vec<Vec<(JoinKey, Row)>>;
type PairPartitions = Vec<Vec<(Row, Row)>>;

/// Hashable form of a join column value.
///
/// Values that `=` treats as equal share a key. Integral floats (-0.0
/// included) fold into integers and timestamps into text. NULL and NaN
/// have no key and never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Integer(i64),
    Float(u64),
    Text(String),
    Boolean(bool),
    Blob(Vec<u8>),
}

impl JoinKey {
    fn from_value(value: &DataValue) -> Option<JoinKey> {
        match value {
            DataValue::Null => None,
            DataValue::Integer(i) => Some(JoinKey::Integer(*i)),
            DataValue::Float(f) if f.is_nan() => None,
            DataValue::Float(f) => Some(integral(*f).map_or(JoinKey::Float(float_bits(*f)), JoinKey::Integer)),
            DataValue::Text(s) | DataValue::Timestamp(s) => Some(JoinKey::Text(s.clone())),
            DataValue::Boolean(b) => Some(JoinKey::Boolean(*b)),
            DataValue::Blob(b) => Some(JoinKey::Blob(b.clone())),
        }
    }
}

/// The integer a float holds exactly, if any
fn integral(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is out of range
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// A collection whose rows are keyed by one column
#[derive(Debug, Clone)]
pub struct KeyedCollection {
    source: PartitionedCollection,
    column: String,
}

impl KeyedCollection {
    pub(crate) fn new(source: PartitionedCollection, column: String) -> Self {
        KeyedCollection { source, column }
    }

    pub fn key_column(&self) -> &str {
        &self.column
    }

    pub fn source(&self) -> &PartitionedCollection {
        &self.source
    }

    /// Inner equality join with `other`.
    ///
    /// Every left row meets every right row carrying an equal key. Rows
    /// without the key column, or with a NULL key, never match.
    pub fn join(&self, other: &KeyedCollection) -> JoinedCollection {
        let partitions = self
            .source
            .num_partitions()
            .max(other.source.num_partitions())
            .max(1);

        JoinedCollection {
            left: self.clone(),
            right: other.clone(),
            partitions,
            shuffled: Arc::new(OnceCell::new()),
        }
    }

    /// Hash-partition `(key, row)` entries into `buckets` buckets.
    ///
    /// Within a bucket, entries keep source partition order and row order.
    fn bucketize(&self, buckets: usize) -> QueryResult<KeyedBuckets> {
        let column = self.column.as_str();
        let per_partition = self
            .source
            .context()
            .run_partitions(self.source.num_partitions(), |partition| {
                let mut local: KeyedBuckets = (0..buckets).map(|_| Vec::new()).collect();
                for row in self.source.compute_partition(partition)? {
                    let key = match row.get(column).and_then(JoinKey::from_value) {
                        Some(key) => key,
                        None => continue,
                    };
                    local[bucket_for(&key, buckets)].push((key, row));
                }
                Ok(local)
            })?;

        let mut merged: KeyedBuckets = (0..buckets).map(|_| Vec::new()).collect();
        for local in per_partition {
            for (bucket, entries) in local.into_iter().enumerate() {
                merged[bucket].extend(entries);
            }
        }
        Ok(merged)
    }
}

fn bucket_for(key: &JoinKey, buckets: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % buckets as u64) as usize
}

/// Matched `(left, right)` row pairs of a keyed join.
///
/// The shuffle runs on first use and is kept for every later action on
/// this join or on collections derived from it.
#[derive(Clone)]
pub struct JoinedCollection {
    left: KeyedCollection,
    right: KeyedCollection,
    partitions: usize,
    shuffled: Arc<OnceCell<PairPartitions>>,
}

impl fmt::Debug for JoinedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinedCollection")
            .field("left", &self.left.source().id())
            .field("left_key", &self.left.key_column())
            .field("right", &self.right.source().id())
            .field("right_key", &self.right.key_column())
            .field("partitions", &self.partitions)
            .finish()
    }
}

impl JoinedCollection {
    pub fn num_partitions(&self) -> usize {
        self.partitions
    }

    pub fn context(&self) -> &EngineContext {
        self.left.source().context()
    }

    /// Combine every matched pair into one row
    pub fn merge(&self, merger: PairMerger) -> PartitionedCollection {
        PartitionedCollection::merged(self.clone(), merger)
    }

    /// Number of matched pairs
    pub fn count(&self) -> QueryResult<u64> {
        Ok(self.shuffled()?.iter().map(|pairs| pairs.len() as u64).sum())
    }

    pub(crate) fn partition_pairs(&self, partition: PartitionId) -> QueryResult<&[(Row, Row)]> {
        self.shuffled()?
            .get(partition)
            .map(|pairs| pairs.as_slice())
            .ok_or_else(|| {
                QueryError::EngineFailure(format!("join has no partition {}", partition))
            })
    }

    fn shuffled(&self) -> QueryResult<&PairPartitions> {
        self.shuffled.get_or_try_init(|| self.shuffle())
    }

    fn shuffle(&self) -> QueryResult<PairPartitions> {
        let buckets = self.partitions;
        let left = self.left.bucketize(buckets)?;
        let right = self.right.bucketize(buckets)?;

        self.context().run_partitions(buckets, |bucket| {
            let mut index: HashMap<&JoinKey, Vec<&Row>> = HashMap::new();
            for (key, row) in &right[bucket] {
                index.entry(key).or_default().push(row);
            }

            let mut pairs = Vec::new();
            for (key, left_row) in &left[bucket] {
                if let Some(matches) = index.get(key) {
                    for right_row in matches {
                        pairs.push((left_row.clone(), (*right_row).clone()));
                    }
                }
            }
            Ok(pairs)
        })
    }
}
