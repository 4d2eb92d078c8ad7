use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use deepquery::{
    DataValue, JoinSpec, MemoryStore, PlanNode, QueryError, QueryLogger, Relation, SelectStatement, Statement,
    execute_plan,
};

#[path = "../common/mod.rs"]
mod common;
use common::{engine, engine_context, int_column, shop_store, strings};

fn scan(table: &str) -> PlanNode {
    PlanNode::leaf(Statement::Select(SelectStatement::new("shop", table)))
}

#[test]
fn test_single_leaf_plan() -> Result<()> {
    let engine = engine(shop_store(3), 100);
    let log = QueryLogger::new("plan-leaf");

    let root = PlanNode::leaf(Statement::Select(
        SelectStatement::new("shop", "users").with_relation(Relation::new("city", "=", "Lima")),
    ));
    let result = execute_plan(&engine, &root, &log)?;

    assert_eq!(int_column(result.rows(), "id"), vec![2, 5]);
    Ok(())
}

#[test]
fn test_join_plan() -> Result<()> {
    let engine = engine(shop_store(3), 100);
    let log = QueryLogger::new("plan-join");

    let root = PlanNode::join(
        Statement::Select(
            SelectStatement::new("shop", "users")
                .with_fields(["users.city", "orders.oid"])
                .with_join(JoinSpec::new("orders", "users.id", "orders.user_id")),
        ),
        PlanNode::leaf(Statement::Select(
            SelectStatement::new("shop", "users").with_relation(Relation::new("city", "=", "Oslo")),
        )),
        scan("orders"),
    );
    let result = execute_plan(&engine, &root, &log)?;

    assert_eq!(result.columns(), &["city", "oid"]);
    assert_eq!(int_column(result.rows(), "oid"), vec![100, 101, 102]);
    assert!(result.rows().iter().all(|row| row.get("city") == Some(&DataValue::from("Oslo"))));
    Ok(())
}

#[test]
fn test_count_is_independent_of_partitioning() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut values: Vec<i64> = (0..500).map(|_| rng.gen_range(0..1000)).collect();
    let expected = values.iter().filter(|v| **v >= 250).count() as u64;

    for partitions in [1, 2, 7, 16, 64] {
        values.shuffle(&mut rng);

        let store = MemoryStore::with_partitions(engine_context(4, partitions), partitions);
        store.create_table("metrics", "samples", strings(&["value"]));
        for value in &values {
            store.insert("metrics", "samples", vec![DataValue::Integer(*value)])?;
        }

        let root = PlanNode::leaf(Statement::Select(
            SelectStatement::new("metrics", "samples")
                .with_count()
                .with_relation(Relation::new("value", ">=", 250)),
        ));
        let log = QueryLogger::new(format!("plan-count-{}", partitions));
        let result = execute_plan(&engine(std::sync::Arc::new(store), 10), &root, &log)?;

        assert_eq!(result.count(), Some(expected), "partitions = {}", partitions);
    }
    Ok(())
}

#[test]
fn test_plan_result_bound() -> Result<()> {
    let log = QueryLogger::new("plan-bound");

    for (limit, expected) in [(3, 3), (5, 5), (6, 6), (1000, 6)] {
        let result = execute_plan(&engine(shop_store(4), limit), &scan("users"), &log)?;
        assert_eq!(result.row_count(), expected, "limit = {}", limit);
    }
    Ok(())
}

#[test]
fn test_invalid_plans() {
    let engine = engine(shop_store(2), 100);
    let log = QueryLogger::new("plan-invalid");

    // A join with a single child
    let lonely = PlanNode {
        statement: Statement::Select(
            SelectStatement::new("shop", "users").with_join(JoinSpec::new("orders", "id", "user_id")),
        ),
        children: vec![scan("orders")],
    };
    assert!(matches!(execute_plan(&engine, &lonely, &log), Err(QueryError::InvalidPlan(_))));

    // An unknown table anywhere fails the whole plan
    let broken = PlanNode::join(
        Statement::Select(
            SelectStatement::new("shop", "users").with_join(JoinSpec::new("ghosts", "id", "user_id")),
        ),
        scan("users"),
        scan("ghosts"),
    );
    assert_eq!(
        execute_plan(&engine, &broken, &log).unwrap_err(),
        QueryError::UnresolvedTable("shop.ghosts".to_string())
    );
}
