use anyhow::{Result, anyhow};
use deepquery::{DataValue, JoinSpec, NodeResult, QueryLogger, SelectStatement, Statement};

#[path = "../common/mod.rs"]
mod common;
use common::{engine, int_column, shop_store};

fn children(engine: &deepquery::ExecutionEngine, log: &QueryLogger) -> Result<Vec<NodeResult>> {
    let users = Statement::Select(SelectStatement::new("shop", "users"));
    let orders = Statement::Select(SelectStatement::new("shop", "orders"));
    Ok(vec![
        engine.execute(&users, Vec::new(), false, log)?,
        engine.execute(&orders, Vec::new(), false, log)?,
    ])
}

fn users_orders() -> SelectStatement {
    SelectStatement::new("shop", "users")
        .with_fields(["users.name", "orders.oid", "orders.amount"])
        .with_join(JoinSpec::new("orders", "users.id", "orders.user_id"))
}

#[test]
fn test_join_matches_on_key() -> Result<()> {
    let engine = engine(shop_store(3), 1000);
    let log = QueryLogger::new("join-key");

    let inputs = children(&engine, &log)?;
    assert!(inputs.iter().all(|child| !child.is_final()));

    let result = engine
        .execute(&Statement::Select(users_orders()), inputs, true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("join must produce a final result"))?;

    assert_eq!(result.columns(), &["name", "oid", "amount"]);
    assert_eq!(int_column(result.rows(), "oid"), vec![100, 101, 102, 103]);

    // Rows hold exactly the selected columns, drawn from both sides
    for row in result.rows() {
        assert_eq!(row.columns(), vec!["name", "oid", "amount"]);
        assert!(matches!(row.get("name"), Some(DataValue::Text(_))));
        assert!(row.get("user_id").is_none());
    }
    Ok(())
}

#[test]
fn test_join_duplicate_keys_produce_every_pair() -> Result<()> {
    let engine = engine(shop_store(2), 1000);
    let log = QueryLogger::new("join-dupes");

    let result = engine
        .execute(&Statement::Select(users_orders()), children(&engine, &log)?, true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("join must produce a final result"))?;

    let alice_orders = result
        .rows()
        .iter()
        .filter(|row| row.get("name") == Some(&DataValue::from("Alice")))
        .count();
    assert_eq!(alice_orders, 2);
    Ok(())
}

#[test]
fn test_join_without_matches_is_empty() -> Result<()> {
    let store = shop_store(2);
    store.create_table("shop", "refunds", common::strings(&["rid", "user_id"]));
    store.insert("shop", "refunds", vec![1.into(), 42.into()])?;

    let engine = engine(store, 1000);
    let log = QueryLogger::new("join-empty");

    let users = Statement::Select(SelectStatement::new("shop", "users"));
    let refunds = Statement::Select(SelectStatement::new("shop", "refunds"));
    let inputs = vec![
        engine.execute(&users, Vec::new(), false, &log)?,
        engine.execute(&refunds, Vec::new(), false, &log)?,
    ];

    let join = SelectStatement::new("shop", "users").with_join(JoinSpec::new("refunds", "id", "user_id"));
    let result = engine
        .execute(&Statement::Select(join), inputs, true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("join must produce a final result"))?;

    assert_eq!(result.row_count(), 0);
    assert!(result.columns().is_empty());
    Ok(())
}

#[test]
fn test_join_result_is_bounded() -> Result<()> {
    let engine = engine(shop_store(4), 2);
    let log = QueryLogger::new("join-bound");

    let result = engine
        .execute(&Statement::Select(users_orders()), children(&engine, &log)?, true, &log)?
        .into_final()
        .ok_or_else(|| anyhow!("join must produce a final result"))?;

    assert_eq!(result.row_count(), 2);
    Ok(())
}
