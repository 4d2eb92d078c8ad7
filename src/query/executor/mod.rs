// Query Executor Module
//
// Executes single plan nodes: leaf scans with predicate filters, equality
// joins over child collections, and result materialization.

pub mod engine;
pub mod result;
pub mod predicate;
pub mod scan;
pub mod join;
pub mod materialize;

pub use self::engine::ExecutionEngine;
pub use self::result::{DataValue, NodeResult, QueryError, QueryResult, QueryResultSet, Row};
