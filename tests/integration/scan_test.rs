use anyhow::{Result, anyhow};
use deepquery::{JoinSpec, QueryError, QueryLogger, Relation, SelectStatement, Statement};

#[path = "../common/mod.rs"]
mod common;
use common::{engine, int_column, shop_store};

fn select(statement: SelectStatement) -> Statement {
    Statement::Select(statement)
}

#[test]
fn test_scan_without_predicates_returns_whole_table() -> Result<()> {
    let engine = engine(shop_store(4), 1000);
    let log = QueryLogger::new("scan-all");

    let result = engine
        .execute(&select(SelectStatement::new("shop", "users")), Vec::new(), true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;

    assert_eq!(result.row_count(), 6);
    assert_eq!(result.columns(), &["id", "name", "age", "city"]);
    Ok(())
}

#[test]
fn test_equality_predicate() -> Result<()> {
    let engine = engine(shop_store(3), 1000);
    let log = QueryLogger::new("scan-eq");

    let statement = SelectStatement::new("shop", "users").with_relation(Relation::new("city", "=", "Oslo"));
    let result = engine
        .execute(&select(statement), Vec::new(), true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;

    assert_eq!(int_column(result.rows(), "id"), vec![1, 3, 6]);
    Ok(())
}

#[test]
fn test_chained_predicates_are_anded() -> Result<()> {
    let engine = engine(shop_store(2), 1000);
    let log = QueryLogger::new("scan-and");

    let ids = |statement: SelectStatement| -> Result<Vec<i64>> {
        let result = engine
            .execute(&select(statement), Vec::new(), true, &log)?
            .into_final()
            .ok_or_else(|| anyhow!("expected a final result"))?;
        Ok(int_column(result.rows(), "id"))
    };

    let a = Relation::new("id", "<=", 3);
    let b = Relation::new("id", ">=", 2);
    let b_upper = Relation::new("id", "<", 5);

    assert_eq!(ids(SelectStatement::new("shop", "users").with_relation(a.clone()))?, vec![1, 2, 3]);
    assert_eq!(
        ids(SelectStatement::new("shop", "users").with_relation(b.clone()).with_relation(b_upper.clone()))?,
        vec![2, 3, 4]
    );
    assert_eq!(
        ids(SelectStatement::new("shop", "users")
            .with_relation(a)
            .with_relation(b)
            .with_relation(b_upper))?,
        vec![2, 3]
    );
    Ok(())
}

#[test]
fn test_qualified_projection_and_predicate() -> Result<()> {
    let engine = engine(shop_store(2), 1000);
    let log = QueryLogger::new("scan-qualified");

    let statement = SelectStatement::new("shop", "users")
        .with_fields(["users.id", "users.age"])
        .with_relation(Relation::new("users.age", ">", 40));
    let result = engine
        .execute(&select(statement), Vec::new(), true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;

    assert_eq!(result.columns(), &["id", "age"]);
    assert_eq!(int_column(result.rows(), "id"), vec![3, 6]);
    assert!(result.rows().iter().all(|row| row.get("name").is_none()));
    Ok(())
}

#[test]
fn test_predicate_on_column_outside_projection() -> Result<()> {
    let engine = engine(shop_store(3), 1000);
    let log = QueryLogger::new("scan-unprojected");

    let statement = SelectStatement::new("shop", "users")
        .with_fields(["id"])
        .with_relation(Relation::new("city", "=", "Oslo"));

    let result = engine
        .execute(&select(statement.clone()), Vec::new(), true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;
    assert_eq!(result.columns(), &["id"]);
    assert_eq!(int_column(result.rows(), "id"), vec![1, 3, 6]);
    assert!(result.rows().iter().all(|row| row.get("city").is_none()));

    // Below the root the same node feeds a join with the filtered rows
    let children = vec![
        engine.execute(&select(statement), Vec::new(), false, &log)?,
        engine.execute(&select(SelectStatement::new("shop", "orders")), Vec::new(), false, &log)?,
    ];
    let join = SelectStatement::new("shop", "users").with_join(JoinSpec::new("orders", "users.id", "orders.user_id"));
    let joined = engine
        .execute(&select(join), children, true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;
    assert_eq!(int_column(joined.rows(), "oid"), vec![100, 101, 102]);
    assert!(joined.rows().iter().all(|row| row.get("city").is_none()));
    Ok(())
}

#[test]
fn test_count_mode() -> Result<()> {
    let engine = engine(shop_store(5), 2);
    let log = QueryLogger::new("scan-count");

    let statement = SelectStatement::new("shop", "users")
        .with_count()
        .with_relation(Relation::new("age", ">=", 30));
    let result = engine
        .execute(&select(statement), Vec::new(), true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;

    assert_eq!(result.count(), Some(4));
    Ok(())
}

#[test]
fn test_result_bound_truncates() -> Result<()> {
    let log = QueryLogger::new("scan-bound");

    let capped = engine(shop_store(3), 4)
        .execute(&select(SelectStatement::new("shop", "users")), Vec::new(), true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;
    assert_eq!(capped.row_count(), 4);

    let uncapped = engine(shop_store(3), 50)
        .execute(&select(SelectStatement::new("shop", "users")), Vec::new(), true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("expected a final result"))?;
    assert_eq!(uncapped.row_count(), 6);
    Ok(())
}

#[test]
fn test_unresolved_table_and_unsupported_operator() {
    let engine = engine(shop_store(2), 10);
    let log = QueryLogger::new("scan-errors");

    let missing = engine.execute(&select(SelectStatement::new("shop", "payments")), Vec::new(), false, &log);
    assert_eq!(missing.unwrap_err(), QueryError::UnresolvedTable("shop.payments".to_string()));

    let like = SelectStatement::new("shop", "users").with_relation(Relation::new("name", "LIKE", "A%"));
    let unsupported = engine.execute(&select(like), Vec::new(), true, &log);
    assert!(matches!(unsupported, Err(QueryError::UnsupportedPredicate(_))));
}
