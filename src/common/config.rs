// Configuration
//
// Caller-owned settings for the executor and the collection engine.

use serde::{Deserialize, Serialize};

use crate::common::types::{DEFAULT_PARTITIONS, DEFAULT_RESULT_SIZE};

/// Configuration for plan-node execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum number of rows materialized for a root result
    pub result_limit: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_SIZE,
        }
    }
}

impl ExecutorConfig {
    /// Override the root result bound
    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }
}

/// Configuration for the partitioned-collection engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of worker threads used for partition-level work
    pub parallelism: usize,

    /// Number of partitions a new source collection is split into
    pub default_partitions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            default_partitions: DEFAULT_PARTITIONS,
        }
    }
}
