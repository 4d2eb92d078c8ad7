#![allow(dead_code)]

use std::sync::Arc;

use deepquery::{DataValue, EngineConfig, EngineContext, ExecutionEngine, ExecutorConfig, MemoryStore, Row};

// Create an engine context with fixed parallelism and partition count
pub fn engine_context(parallelism: usize, partitions: usize) -> EngineContext {
    EngineContext::new(EngineConfig {
        parallelism,
        default_partitions: partitions,
    })
}

// Create a store holding the `shop.users` and `shop.orders` tables
pub fn shop_store(partitions: usize) -> Arc<MemoryStore> {
    let store = MemoryStore::with_partitions(engine_context(3, partitions), partitions);

    store.create_table("shop", "users", strings(&["id", "name", "age", "city"]));
    let users: [(i64, &str, i64, &str); 6] = [
        (1, "Alice", 34, "Oslo"),
        (2, "Bob", 27, "Lima"),
        (3, "Carol", 45, "Oslo"),
        (4, "Dave", 19, "Kyiv"),
        (5, "Erin", 31, "Lima"),
        (6, "Frank", 52, "Oslo"),
    ];
    for (id, name, age, city) in users {
        store
            .insert("shop", "users", vec![id.into(), name.into(), age.into(), city.into()])
            .expect("insert user");
    }

    store.create_table("shop", "orders", strings(&["oid", "user_id", "amount"]));
    let orders: [(i64, i64, f64); 5] = [
        (100, 1, 9.5),
        (101, 1, 20.0),
        (102, 3, 7.25),
        (103, 5, 100.0),
        (104, 9, 1.0),
    ];
    for (oid, user_id, amount) in orders {
        store
            .insert("shop", "orders", vec![oid.into(), user_id.into(), amount.into()])
            .expect("insert order");
    }

    Arc::new(store)
}

// Create an engine over a store with the given result bound
pub fn engine(store: Arc<MemoryStore>, result_limit: usize) -> ExecutionEngine {
    ExecutionEngine::new(store, ExecutorConfig::default().with_result_limit(result_limit))
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// Sorted integer values of one column
pub fn int_column(rows: &[Row], column: &str) -> Vec<i64> {
    let mut values: Vec<i64> = rows
        .iter()
        .filter_map(|row| match row.get(column) {
            Some(DataValue::Integer(i)) => Some(*i),
            _ => None,
        })
        .collect();
    values.sort();
    values
}
