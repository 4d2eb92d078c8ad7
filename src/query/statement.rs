// Statement Model
//
// Read-only description of the statements handed to the executor by the
// upstream parser and planner.

use std::fmt;

use crate::query::executor::result::DataValue;

/// Represents a statement reaching the executor
#[derive(Debug, Clone)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl Statement {
    /// Statement keyword, used in messages
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "SELECT",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
        }
    }
}

/// What a SELECT returns
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Named columns, possibly qualified as `table.column`; empty means `*`
    Fields(Vec<String>),
    /// A single row count
    Count,
}

impl Selection {
    /// All columns
    pub fn all() -> Self {
        Selection::Fields(Vec::new())
    }

    pub fn is_count(&self) -> bool {
        matches!(self, Selection::Count)
    }
}

/// One WHERE predicate: `identifier operator term`
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// Target column, possibly qualified as `table.column`
    pub identifier: String,
    /// Comparison operator token as written
    pub operator: String,
    /// Literal operands
    pub terms: Vec<DataValue>,
}

impl Relation {
    /// Relation with a single literal operand
    pub fn new(identifier: impl Into<String>, operator: impl Into<String>, term: impl Into<DataValue>) -> Self {
        Relation {
            identifier: identifier.into(),
            operator: operator.into(),
            terms: vec![term.into()],
        }
    }
}

/// Equality join between the two children of a join node
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    /// Table joined against
    pub table: String,
    /// Key column of the first child
    pub left_column: String,
    /// Key column of the second child
    pub right_column: String,
}

impl JoinSpec {
    pub fn new(table: impl Into<String>, left_column: impl Into<String>, right_column: impl Into<String>) -> Self {
        JoinSpec {
            table: table.into(),
            left_column: left_column.into(),
            right_column: right_column.into(),
        }
    }
}

/// SELECT statement representation
#[derive(Debug, Clone)]
pub struct SelectStatement {
    pub keyspace: String,
    pub table: String,
    pub selection: Selection,
    /// WHERE relations, implicitly ANDed in order
    pub where_clause: Vec<Relation>,
    pub join: Option<JoinSpec>,
}

impl SelectStatement {
    /// `SELECT * FROM keyspace.table`
    pub fn new(keyspace: impl Into<String>, table: impl Into<String>) -> Self {
        SelectStatement {
            keyspace: keyspace.into(),
            table: table.into(),
            selection: Selection::all(),
            where_clause: Vec::new(),
            join: None,
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection = Selection::Fields(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_count(mut self) -> Self {
        self.selection = Selection::Count;
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.where_clause.push(relation);
        self
    }

    pub fn with_join(mut self, join: JoinSpec) -> Self {
        self.join = Some(join);
        self
    }
}

/// INSERT statement representation
#[derive(Debug, Clone)]
pub struct InsertStatement {
    pub keyspace: String,
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<DataValue>,
}

/// UPDATE statement representation
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    pub keyspace: String,
    pub table: String,
    pub assignments: Vec<(String, DataValue)>,
    pub where_clause: Vec<Relation>,
}

/// DELETE statement representation
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    pub keyspace: String,
    pub table: String,
    pub where_clause: Vec<Relation>,
}

fn write_where(f: &mut fmt::Formatter<'_>, relations: &[Relation]) -> fmt::Result {
    for (i, relation) in relations.iter().enumerate() {
        write!(f, "{}{}", if i == 0 { " WHERE " } else { " AND " }, relation)?;
    }
    Ok(())
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terms: Vec<String> = self.terms.iter().map(|t| t.to_literal()).collect();
        write!(f, "{} {} {}", self.identifier, self.operator, terms.join(", "))
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        match &self.selection {
            Selection::Count => write!(f, "COUNT(*)")?,
            Selection::Fields(fields) if fields.is_empty() => write!(f, "*")?,
            Selection::Fields(fields) => write!(f, "{}", fields.join(", "))?,
        }
        write!(f, " FROM {}.{}", self.keyspace, self.table)?;
        if let Some(join) = &self.join {
            write!(f, " INNER JOIN {} ON {} = {}", join.table, join.left_column, join.right_column)?;
        }
        write_where(f, &self.where_clause)?;
        write!(f, ";")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(select) => write!(f, "{}", select),
            Statement::Insert(insert) => {
                let values: Vec<String> = insert.values.iter().map(|v| v.to_literal()).collect();
                write!(
                    f,
                    "INSERT INTO {}.{} ({}) VALUES ({});",
                    insert.keyspace,
                    insert.table,
                    insert.columns.join(", "),
                    values.join(", ")
                )
            }
            Statement::Update(update) => {
                let assignments: Vec<String> = update
                    .assignments
                    .iter()
                    .map(|(column, value)| format!("{} = {}", column, value.to_literal()))
                    .collect();
                write!(f, "UPDATE {}.{} SET {}", update.keyspace, update.table, assignments.join(", "))?;
                write_where(f, &update.where_clause)?;
                write!(f, ";")
            }
            Statement::Delete(delete) => {
                write!(f, "DELETE FROM {}.{}", delete.keyspace, delete.table)?;
                write_where(f, &delete.where_clause)?;
                write!(f, ";")
            }
        }
    }
}
