// Query Result Implementation
//
// This module defines the value, row, error and result types exchanged
// between plan nodes and their caller.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::PartitionedCollection;
use crate::common::types::{COUNT_COLUMN, RESULT_COLUMN};

/// Possible data types for values in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(String),
    Blob(Vec<u8>),
}

impl Eq for DataValue {}

impl Hash for DataValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DataValue::Null => 0.hash(state),
            DataValue::Integer(i) => { 1.hash(state); i.hash(state); }
            DataValue::Float(f) => { 2.hash(state); float_bits(*f).hash(state); }
            DataValue::Text(s) => { 3.hash(state); s.hash(state); }
            DataValue::Boolean(b) => { 4.hash(state); b.hash(state); }
            DataValue::Timestamp(s) => { 5.hash(state); s.hash(state); }
            DataValue::Blob(b) => { 6.hash(state); b.hash(state); }
        }
    }
}

/// Bit pattern of a float with -0.0 folded into 0.0 and every NaN into one
pub(crate) fn float_bits(f: f64) -> u64 {
    if f == 0.0 {
        0.0f64.to_bits()
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => write!(f, "NULL"),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Text(s) => write!(f, "{}", s),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::Timestamp(s) => write!(f, "{}", s),
            DataValue::Blob(b) => write!(f, "BLOB ({} bytes)", b.len()),
        }
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Integer(i64::from(value))
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::Text(value)
    }
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Boolean(value)
    }
}

impl DataValue {
    /// Natural ordering between two non-null values of compatible types.
    ///
    /// Integers and floats compare numerically, text and timestamps
    /// lexicographically, blobs bytewise. NULL and mixed incompatible types have no
    /// ordering and return `None`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (DataValue::Integer(a), DataValue::Integer(b)) => Some(a.cmp(b)),
            (DataValue::Float(a), DataValue::Float(b)) => a.partial_cmp(b),
            (DataValue::Integer(a), DataValue::Float(b)) => (*a as f64).partial_cmp(b),
            (DataValue::Float(a), DataValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (DataValue::Text(a), DataValue::Text(b)) => Some(a.cmp(b)),
            (DataValue::Boolean(a), DataValue::Boolean(b)) => Some(a.cmp(b)),
            (DataValue::Timestamp(a), DataValue::Timestamp(b)) => Some(a.cmp(b)),
            (DataValue::Text(a), DataValue::Timestamp(b)) => Some(a.cmp(b)),
            (DataValue::Timestamp(a), DataValue::Text(b)) => Some(a.cmp(b)),
            (DataValue::Blob(a), DataValue::Blob(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Render the value as a CQL literal
    pub fn to_literal(&self) -> String {
        match self {
            DataValue::Null => "null".to_string(),
            DataValue::Integer(i) => i.to_string(),
            DataValue::Float(f) => f.to_string(),
            DataValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
            DataValue::Boolean(b) => b.to_string(),
            DataValue::Timestamp(s) => format!("'{}'", s),
            DataValue::Blob(b) => format!("0x{}", hex::encode(b)),
        }
    }
}

/// Represents a row: an ordered mapping from column name to value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: LinkedHashMap<String, DataValue>,
}

impl Row {
    /// Create a new empty row
    pub fn new() -> Self {
        Row {
            values: LinkedHashMap::new(),
        }
    }

    /// Create a row from column values
    pub fn from_values(columns: Vec<String>, values: Vec<DataValue>) -> Self {
        let mut row = Row::new();
        for (col, val) in columns.into_iter().zip(values) {
            row.set(col, val);
        }
        row
    }

    /// Get a value by column name
    pub fn get(&self, column: &str) -> Option<&DataValue> {
        self.values.get(column)
    }

    /// Set a value for a column.
    ///
    /// An existing column keeps its position and takes the new value.
    pub fn set(&mut self, column: String, value: DataValue) {
        match self.values.get_mut(&column) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(column, value);
            }
        }
    }

    /// Copy of the row holding only `columns`, in that order.
    ///
    /// Columns the row lacks come back as NULL.
    pub fn project(&self, columns: &[String]) -> Row {
        let mut projected = Row::new();
        for column in columns {
            let value = self.get(column).cloned().unwrap_or(DataValue::Null);
            projected.set(column.clone(), value);
        }
        projected
    }

    /// Column names in insertion order
    pub fn columns(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Values in column order
    pub fn values(&self) -> Vec<&DataValue> {
        self.values.values().collect()
    }

    /// Column/value pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DataValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Represents query execution error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The storage scan could not resolve keyspace/table
    #[error("Table not found: {0}")]
    UnresolvedTable(String),
    /// A projected column does not exist in the table
    #[error("Column not found: {0}")]
    ColumnNotFound(String),
    /// Predicate operator or operand shape is not supported
    #[error("Unsupported predicate: {0}")]
    UnsupportedPredicate(String),
    /// Statement kind the executor cannot run
    #[error("Unsupported statement: {0}")]
    UnsupportedStatement(String),
    /// Join node without a resolvable key pair
    #[error("Join key missing: {0}")]
    JoinKeyMissing(String),
    /// Runtime fault raised by the collection engine
    #[error("Engine failure: {0}")]
    EngineFailure(String),
    /// Plan node inputs violate the node shape
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
    /// Row does not fit the table it is written to
    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Materialized payload of a final result
#[derive(Debug, Clone, PartialEq)]
pub enum ResultBody {
    /// Bounded sequence of rows
    Rows(Vec<Row>),
    /// Single count value
    Count(u64),
}

/// Query resultset representation
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResultSet {
    /// Column names in the resultset
    columns: Vec<String>,
    /// Rows or count
    body: ResultBody,
}

impl QueryResultSet {
    /// Create a row resultset
    pub fn from_rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        QueryResultSet {
            columns,
            body: ResultBody::Rows(rows),
        }
    }

    /// Create a single-value count resultset
    pub fn from_count(count: u64) -> Self {
        QueryResultSet {
            columns: vec![COUNT_COLUMN.to_string()],
            body: ResultBody::Count(count),
        }
    }

    /// Resultset carrying one explanatory text row
    pub fn message(text: impl Into<String>) -> Self {
        let row = Row::from_values(
            vec![RESULT_COLUMN.to_string()],
            vec![DataValue::Text(text.into())],
        );
        Self::from_rows(vec![RESULT_COLUMN.to_string()], vec![row])
    }

    /// Get the columns in the resultset
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn body(&self) -> &ResultBody {
        &self.body
    }

    /// Get the rows in the resultset; empty for count results
    pub fn rows(&self) -> &[Row] {
        match &self.body {
            ResultBody::Rows(rows) => rows,
            ResultBody::Count(_) => &[],
        }
    }

    /// Count value, if this is a count result
    pub fn count(&self) -> Option<u64> {
        match self.body {
            ResultBody::Count(count) => Some(count),
            ResultBody::Rows(_) => None,
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        match &self.body {
            ResultBody::Rows(rows) => rows.len(),
            ResultBody::Count(_) => 1,
        }
    }

    /// Format the resultset as a string table
    pub fn to_string_table(&self) -> String {
        if self.columns.is_empty() {
            return "Empty result".to_string();
        }

        let mut result = String::new();

        result.push_str("| ");
        for col in &self.columns {
            result.push_str(&format!("{} | ", col));
        }
        result.push('\n');

        result.push('|');
        for col in &self.columns {
            result.push_str(&format!("{}|", "-".repeat(col.len() + 2)));
        }
        result.push('\n');

        match &self.body {
            ResultBody::Count(count) => {
                result.push_str(&format!("| {} |\n", count));
            }
            ResultBody::Rows(rows) => {
                for row in rows {
                    result.push_str("| ");
                    for col in &self.columns {
                        match row.get(col) {
                            Some(value) => result.push_str(&format!("{} | ", value)),
                            None => result.push_str("NULL | "),
                        }
                    }
                    result.push('\n');
                }
            }
        }

        result
    }
}

impl fmt::Display for QueryResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_table())
    }
}

/// Distributed data handed from a child node to its parent join node.
///
/// Only the executor can build one or reach the collection inside it.
#[derive(Debug, Clone)]
pub struct IntermediateResult {
    collection: PartitionedCollection,
    columns: Vec<String>,
}

impl IntermediateResult {
    pub(crate) fn new(collection: PartitionedCollection, columns: Vec<String>) -> Self {
        IntermediateResult { collection, columns }
    }

    pub(crate) fn into_collection(self) -> PartitionedCollection {
        self.collection
    }

    /// Projected columns of the carried collection; empty means all columns
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of partitions of the carried collection
    pub fn num_partitions(&self) -> usize {
        self.collection.num_partitions()
    }
}

/// Value exchanged between the plan executor and its caller
#[derive(Debug, Clone)]
pub enum NodeResult {
    /// User-facing result of the plan root
    Final(QueryResultSet),
    /// Lazily evaluated collection for a parent join node
    Intermediate(IntermediateResult),
}

impl NodeResult {
    pub fn is_final(&self) -> bool {
        matches!(self, NodeResult::Final(_))
    }

    /// The final resultset, if this is a final result
    pub fn into_final(self) -> Option<QueryResultSet> {
        match self {
            NodeResult::Final(result_set) => Some(result_set),
            NodeResult::Intermediate(_) => None,
        }
    }
}
