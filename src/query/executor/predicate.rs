// Predicate Evaluator
//
// Compiles a single relation (column, operator, literal) into a row test
// that the collection engine applies as a filter.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::collection::RowPredicate;
use crate::common::types::unqualified;
use crate::query::executor::result::{DataValue, QueryError, QueryResult, Row};
use crate::query::statement::Relation;

/// Supported comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterEquals,
    LessThan,
    LessEquals,
}

impl FromStr for ComparisonOperator {
    type Err = QueryError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim() {
            "=" => Ok(ComparisonOperator::Equals),
            "<>" => Ok(ComparisonOperator::NotEquals),
            ">" => Ok(ComparisonOperator::GreaterThan),
            ">=" => Ok(ComparisonOperator::GreaterEquals),
            "<" => Ok(ComparisonOperator::LessThan),
            "<=" => Ok(ComparisonOperator::LessEquals),
            other => Err(QueryError::UnsupportedPredicate(format!("operator '{}'", other))),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ComparisonOperator::Equals => "=",
            ComparisonOperator::NotEquals => "<>",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterEquals => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessEquals => "<=",
        };
        write!(f, "{}", token)
    }
}

impl ComparisonOperator {
    /// Apply the operator to `value op literal`.
    ///
    /// Values without a natural ordering between them (NULL, mismatched
    /// types) never satisfy an ordered comparison and are unequal.
    pub fn evaluate(&self, value: &DataValue, literal: &DataValue) -> bool {
        let ordering = value.compare(literal);
        match self {
            ComparisonOperator::Equals => ordering == Some(Ordering::Equal),
            ComparisonOperator::NotEquals => matches!(ordering, Some(Ordering::Less | Ordering::Greater)),
            ComparisonOperator::GreaterThan => ordering == Some(Ordering::Greater),
            ComparisonOperator::GreaterEquals => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            ComparisonOperator::LessThan => ordering == Some(Ordering::Less),
            ComparisonOperator::LessEquals => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

/// Build a row test for `column operator literal`.
///
/// A qualified column (`table.column`) is looked up by its suffix. A row
/// that lacks the column fails the test.
pub fn compile_predicate(column: &str, operator: &str, literal: DataValue) -> QueryResult<RowPredicate> {
    let operator: ComparisonOperator = operator.parse()?;
    let column = unqualified(column).to_string();

    Ok(Arc::new(move |row: &Row| match row.get(&column) {
        Some(value) => operator.evaluate(value, &literal),
        None => false,
    }))
}

/// Build a row test from a WHERE relation; exactly one term is required
pub fn compile_relation(relation: &Relation) -> QueryResult<RowPredicate> {
    match relation.terms.as_slice() {
        [literal] => compile_predicate(&relation.identifier, &relation.operator, literal.clone()),
        terms => Err(QueryError::UnsupportedPredicate(format!(
            "relation on '{}' has {} terms, expected exactly one",
            relation.identifier,
            terms.len()
        ))),
    }
}
