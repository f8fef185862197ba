//! Integration tests against a live MySQL server.
//! Run with: DB_HOST=... DB_USER=... DB_PASSWORD=... DB_DATABASE=... cargo test -p mysqlc-storage -- --ignored mysql_

#![allow(clippy::unwrap_used, reason = "integration test code")]

use mysqlc_core::{QueryOutcome, env_non_empty, env_parse_with_default};
use mysqlc_storage::{
    ConnectParams, ConnectionManager, Connector, Database, MySqlConnector, SchemaCache,
};

fn params() -> ConnectParams {
    let defaults = ConnectParams::default();
    ConnectParams {
        host: env_non_empty("DB_HOST").unwrap_or(defaults.host),
        port: env_parse_with_default("DB_PORT", defaults.port),
        user: env_non_empty("DB_USER"),
        password: env_non_empty("DB_PASSWORD"),
        database: Some(env_non_empty("DB_DATABASE").expect("DB_DATABASE must be set for MySQL integration tests")),
    }
}

#[tokio::test]
#[ignore = "needs a MySQL server"]
async fn mysql_select_returns_text_cells() {
    let mut conn = MySqlConnector.connect(&params()).await.unwrap();

    let outcome = conn.execute("SELECT 1 AS one, NULL AS nothing, 'x' AS letter").await.unwrap();
    let set = outcome.result_set().unwrap();
    assert_eq!(set.columns, vec!["one", "nothing", "letter"]);
    assert_eq!(set.rows, vec![vec![Some("1".to_owned()), None, Some("x".to_owned())]]);

    conn.close().await.unwrap();
    conn.close().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a MySQL server"]
async fn mysql_affected_rows_and_empty_sets() {
    let mut conn = MySqlConnector.connect(&params()).await.unwrap();
    conn.execute("DROP TABLE IF EXISTS mysqlc_it").await.unwrap();
    conn.execute("CREATE TABLE mysqlc_it (id INT PRIMARY KEY, name VARCHAR(32))").await.unwrap();

    let inserted = conn.execute("INSERT INTO mysqlc_it VALUES (1, 'a'), (2, NULL)").await.unwrap();
    assert_eq!(inserted, QueryOutcome::Affected { rows: 2 });
    conn.commit().await.unwrap();

    let empty = conn.execute("SELECT * FROM mysqlc_it WHERE id > 10").await.unwrap();
    assert!(empty.result_set().is_some_and(mysqlc_core::ResultSet::is_empty));

    let deleted = conn.execute("DELETE FROM mysqlc_it WHERE id = 99").await.unwrap();
    assert_eq!(deleted, QueryOutcome::Affected { rows: 0 });

    conn.execute("DROP TABLE mysqlc_it").await.unwrap();
    conn.close().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a MySQL server"]
async fn mysql_schema_and_current_database() {
    let params = params();
    let expected = params.database.clone();
    let mut manager = ConnectionManager::new(MySqlConnector, params);
    manager.connect().await.unwrap();

    let current = manager.current_database().await.unwrap();
    assert_eq!(current, expected);

    let mut cache = SchemaCache::new();
    assert!(cache.refresh_if_stale(&mut manager, current.as_deref()).await.unwrap());
    assert!(!cache.refresh_if_stale(&mut manager, current.as_deref()).await.unwrap());

    manager.close().await.unwrap();
}

#[tokio::test]
#[ignore = "needs a MySQL server"]
async fn mysql_current_database_without_selection_is_none() {
    let params = ConnectParams { database: None, ..params() };
    let mut conn = MySqlConnector.connect(&params).await.unwrap();

    assert_eq!(conn.current_database().await.unwrap(), None);
    conn.execute(&format!("USE `{}`", crate::params().database.unwrap())).await.unwrap();
    assert_eq!(conn.current_database().await.unwrap(), crate::params().database);

    conn.close().await.unwrap();
}
