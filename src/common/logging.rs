// Query-Scoped Logging
//
// A logger handle created once per query execution and passed to every
// component that takes part in it. Records go through the `log` facade
// under a fixed target and carry the query id.

use std::fmt;

/// Log target used for every executor record
pub const LOG_TARGET: &str = "deepquery::executor";

/// Logging capability scoped to one query execution
#[derive(Debug, Clone)]
pub struct QueryLogger {
    query_id: String,
}

impl QueryLogger {
    /// Create a logger for the query identified by `query_id`
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
        }
    }

    /// Id of the query this logger belongs to
    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        log::debug!(target: LOG_TARGET, "[{}] {}", self.query_id, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        log::info!(target: LOG_TARGET, "[{}] {}", self.query_id, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        log::warn!(target: LOG_TARGET, "[{}] {}", self.query_id, args);
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        log::error!(target: LOG_TARGET, "[{}] {}", self.query_id, args);
    }
}
