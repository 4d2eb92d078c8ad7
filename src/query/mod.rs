// Query Module
//
// Statement model, plan driver and the plan-node executor.

pub mod statement;
pub mod plan;
pub mod executor;

pub use executor::engine::ExecutionEngine;
pub use executor::result::{NodeResult, QueryError, QueryResult, QueryResultSet};
pub use plan::{execute_plan, PlanNode};
