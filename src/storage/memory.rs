// In-Memory Table Store
//
// Keeps tables as row vectors and serves scans as partitioned collections.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::collection::{EngineContext, PartitionedCollection};
use crate::query::executor::result::{DataValue, QueryError, QueryResult, Row};

use super::StorageScan;

/// Table contents held by the store
#[derive(Debug, Clone, Default)]
struct MemTable {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl MemTable {
    /// Project a stored row onto `columns`, in that order
    fn project(&self, row: &Row, columns: &[String]) -> Row {
        if columns.is_empty() {
            return row.clone();
        }
        row.project(columns)
    }
}

/// Store of in-memory tables addressed by keyspace and table name
pub struct MemoryStore {
    context: EngineContext,
    partitions: usize,
    tables: RwLock<HashMap<(String, String), MemTable>>,
}

impl MemoryStore {
    /// Create a store whose scans use the context's default partition count
    pub fn new(context: EngineContext) -> Self {
        let partitions = context.config().default_partitions;
        Self::with_partitions(context, partitions)
    }

    /// Create a store whose scans are split into `partitions` partitions
    pub fn with_partitions(context: EngineContext, partitions: usize) -> Self {
        MemoryStore {
            context,
            partitions: partitions.max(1),
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Create (or replace) an empty table with the given columns
    pub fn create_table(&self, keyspace: &str, table: &str, columns: Vec<String>) {
        let key = (keyspace.to_string(), table.to_string());
        self.tables.write().insert(key, MemTable { columns, rows: Vec::new() });
    }

    /// Append a row given as values in table column order
    pub fn insert(&self, keyspace: &str, table: &str, values: Vec<DataValue>) -> QueryResult<()> {
        let mut tables = self.tables.write();
        let mem_table = tables
            .get_mut(&(keyspace.to_string(), table.to_string()))
            .ok_or_else(|| QueryError::UnresolvedTable(format!("{}.{}", keyspace, table)))?;

        if values.len() != mem_table.columns.len() {
            return Err(QueryError::InvalidRow(format!(
                "{}.{} has {} columns but {} values were given",
                keyspace,
                table,
                mem_table.columns.len(),
                values.len()
            )));
        }

        let row = Row::from_values(mem_table.columns.clone(), values);
        mem_table.rows.push(row);
        Ok(())
    }

    /// Number of rows stored in a table
    pub fn row_count(&self, keyspace: &str, table: &str) -> Option<usize> {
        self.tables
            .read()
            .get(&(keyspace.to_string(), table.to_string()))
            .map(|t| t.rows.len())
    }
}

impl StorageScan for MemoryStore {
    fn scan(&self, keyspace: &str, table: &str, columns: &[String]) -> QueryResult<PartitionedCollection> {
        let tables = self.tables.read();
        let mem_table = tables
            .get(&(keyspace.to_string(), table.to_string()))
            .ok_or_else(|| QueryError::UnresolvedTable(format!("{}.{}", keyspace, table)))?;

        if let Some(missing) = columns.iter().find(|c| !mem_table.columns.contains(c)) {
            return Err(QueryError::ColumnNotFound(format!("{}.{}.{}", keyspace, table, missing)));
        }

        let rows = mem_table
            .rows
            .iter()
            .map(|row| mem_table.project(row, columns))
            .collect();

        Ok(self.context.parallelize(rows, self.partitions))
    }
}
