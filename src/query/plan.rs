// Plan Tree Driver
//
// Walks a plan tree bottom-up, executing every child before its parent.

use crate::common::logging::QueryLogger;
use crate::query::executor::engine::ExecutionEngine;
use crate::query::executor::result::{NodeResult, QueryError, QueryResult, QueryResultSet};
use crate::query::statement::Statement;

/// A node of the execution tree
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub statement: Statement,
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Node without children
    pub fn leaf(statement: Statement) -> Self {
        PlanNode {
            statement,
            children: Vec::new(),
        }
    }

    /// Join node over two children
    pub fn join(statement: Statement, left: PlanNode, right: PlanNode) -> Self {
        PlanNode {
            statement,
            children: vec![left, right],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PlanNode::size).sum::<usize>()
    }
}

/// Execute the tree rooted at `root` and return its final result
pub fn execute_plan(engine: &ExecutionEngine, root: &PlanNode, log: &QueryLogger) -> QueryResult<QueryResultSet> {
    log.info(format_args!("executing plan with {} nodes", root.size()));

    match execute_node(engine, root, true, log)? {
        NodeResult::Final(result_set) => Ok(result_set),
        NodeResult::Intermediate(_) => Err(QueryError::InvalidPlan(
            "plan root produced an intermediate result".to_string(),
        )),
    }
}

fn execute_node(engine: &ExecutionEngine, node: &PlanNode, is_root: bool, log: &QueryLogger) -> QueryResult<NodeResult> {
    let children = node
        .children
        .iter()
        .map(|child| execute_node(engine, child, false, log))
        .collect::<QueryResult<Vec<NodeResult>>>()?;

    engine.execute(&node.statement, children, is_root, log)
}
