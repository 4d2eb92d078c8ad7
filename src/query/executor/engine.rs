// Query Execution Engine Implementation
//
// Executes one plan node at a time. Leaf nodes scan a table; nodes with
// children join the collections their children produced.

use std::sync::Arc;

use crate::common::config::ExecutorConfig;
use crate::common::logging::QueryLogger;
use crate::query::executor::join::JoinExecutor;
use crate::query::executor::materialize::ResultMaterializer;
use crate::query::executor::result::{IntermediateResult, NodeResult, QueryError, QueryResult, QueryResultSet};
use crate::query::executor::scan::LeafScanExecutor;
use crate::query::statement::{SelectStatement, Statement};
use crate::storage::StorageScan;

/// Shape of a plan node, decided by its children
enum NodeShape {
    /// No children: single-table scan
    Leaf,
    /// Two children: equality join of their collections
    Joined {
        left: IntermediateResult,
        right: IntermediateResult,
    },
}

impl NodeShape {
    fn from_children(children: Vec<NodeResult>) -> QueryResult<Self> {
        if children.is_empty() {
            return Ok(NodeShape::Leaf);
        }

        let count = children.len();
        let mut intermediates = children.into_iter().map(|child| match child {
            NodeResult::Intermediate(intermediate) => Ok(intermediate),
            NodeResult::Final(_) => Err(QueryError::InvalidPlan(
                "join child produced a final result instead of a collection".to_string(),
            )),
        });

        match (intermediates.next(), intermediates.next(), intermediates.next()) {
            (Some(left), Some(right), None) => Ok(NodeShape::Joined {
                left: left?,
                right: right?,
            }),
            _ => Err(QueryError::InvalidPlan(format!(
                "join node needs exactly two children, got {}",
                count
            ))),
        }
    }
}

/// Plan-node executor
pub struct ExecutionEngine {
    storage: Arc<dyn StorageScan>,
    config: ExecutorConfig,
}

impl ExecutionEngine {
    pub fn new(storage: Arc<dyn StorageScan>, config: ExecutorConfig) -> Self {
        ExecutionEngine { storage, config }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Execute one plan node.
    ///
    /// `children` holds the results of the node's children, in order, and
    /// must be empty for a leaf. Statements other than SELECT are answered
    /// with a "not supported" result instead of an error.
    pub fn execute(
        &self,
        statement: &Statement,
        children: Vec<NodeResult>,
        is_root: bool,
        log: &QueryLogger,
    ) -> QueryResult<NodeResult> {
        log.info(format_args!("Executing: {}", statement));

        let select = match select_statement(statement) {
            Ok(select) => select,
            Err(QueryError::UnsupportedStatement(kind)) => {
                log.warn(format_args!("{} statements are not supported yet", kind));
                return Ok(NodeResult::Final(QueryResultSet::message(format!(
                    "{} not supported yet",
                    kind
                ))));
            }
            Err(e) => return Err(e),
        };

        let materializer = ResultMaterializer::new(self.config.result_limit, log);

        match NodeShape::from_children(children)? {
            NodeShape::Leaf => {
                LeafScanExecutor::new(self.storage.as_ref(), &materializer, log).execute(select, is_root)
            }
            NodeShape::Joined { left, right } => {
                if !is_root {
                    log.warn(format_args!("join node below the root; result is materialized anyway"));
                }
                JoinExecutor::new(&materializer, log).execute(select, left, right)
            }
        }
    }
}

fn select_statement(statement: &Statement) -> QueryResult<&SelectStatement> {
    match statement {
        Statement::Select(select) => Ok(select),
        other => Err(QueryError::UnsupportedStatement(other.kind().to_string())),
    }
}
