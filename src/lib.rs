// Deep Query Executor
//
// Physical-execution layer that runs SELECT plan trees over partitioned
// collections.

pub mod common;
pub mod collection;
pub mod storage;
pub mod query;

// Re-export key items for convenient access
pub use collection::{EngineContext, PartitionedCollection};
pub use common::{EngineConfig, ExecutorConfig, QueryLogger};
pub use query::executor::result::{DataValue, NodeResult, QueryError, QueryResult, QueryResultSet, Row};
pub use query::plan::{execute_plan, PlanNode};
pub use query::statement::{JoinSpec, Relation, SelectStatement, Selection, Statement};
pub use query::ExecutionEngine;
pub use storage::{MemoryStore, StorageScan};
