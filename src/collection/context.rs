// Engine Context
//
// Owns the engine configuration and runs per-partition tasks on scoped
// worker threads.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::config::EngineConfig;
use crate::common::types::{CollectionId, PartitionId};
use crate::query::executor::result::{QueryError, QueryResult, Row};

use super::partitioned::PartitionedCollection;

// Unique ids for every collection created in this process
static NEXT_COLLECTION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_collection_id() -> CollectionId {
    NEXT_COLLECTION_ID.fetch_add(1, Ordering::SeqCst)
}

/// Handle to the collection engine
#[derive(Debug, Clone)]
pub struct EngineContext {
    config: Arc<EngineConfig>,
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> Self {
        EngineContext {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of worker threads used per action
    pub fn parallelism(&self) -> usize {
        self.config.parallelism.max(1)
    }

    /// Build a source collection split into `partitions` contiguous chunks.
    ///
    /// Partition order follows row order, so iterating partitions in index
    /// order yields the rows as given. At least one partition is created.
    pub fn parallelize(&self, rows: Vec<Row>, partitions: usize) -> PartitionedCollection {
        let partitions = partitions.max(1);
        let chunk_size = rows.len().div_ceil(partitions).max(1);

        let mut chunks: Vec<Vec<Row>> = Vec::with_capacity(partitions);
        let mut rows = rows.into_iter().peekable();
        for _ in 0..partitions {
            let mut chunk = Vec::with_capacity(chunk_size);
            while chunk.len() < chunk_size {
                match rows.next() {
                    Some(row) => chunk.push(row),
                    None => break,
                }
            }
            chunks.push(chunk);
        }

        PartitionedCollection::from_partitions(self.clone(), chunks)
    }

    /// Build a source collection with the configured default partition count
    pub fn parallelize_default(&self, rows: Vec<Row>) -> PartitionedCollection {
        self.parallelize(rows, self.config.default_partitions)
    }

    /// Run `task` once per partition index in `0..count` on worker threads.
    ///
    /// Results come back in partition order. The first task error is
    /// returned; a panicking worker becomes `EngineFailure`.
    pub(crate) fn run_partitions<T, F>(&self, count: usize, task: F) -> QueryResult<Vec<T>>
    where
        T: Send,
        F: Fn(PartitionId) -> QueryResult<T> + Sync,
    {
        if count == 0 {
            return Ok(Vec::new());
        }

        let workers = self.parallelism().min(count);
        let task = &task;

        let joined = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    scope.spawn(move |_| {
                        (worker..count)
                            .step_by(workers)
                            .map(|partition| (partition, task(partition)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        })
        .map_err(|payload| QueryError::EngineFailure(panic_message(payload.as_ref())))?;

        let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
        for batch in joined {
            let batch = batch.map_err(|payload| QueryError::EngineFailure(panic_message(payload.as_ref())))?;
            for (partition, outcome) in batch {
                slots[partition] = Some(outcome?);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(partition, slot)| {
                slot.ok_or_else(|| {
                    QueryError::EngineFailure(format!("partition {} produced no result", partition))
                })
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("worker panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("worker panicked: {}", message)
    } else {
        "worker panicked".to_string()
    }
}
