//! MySQL backend using sqlx.
//!
//! Statements go through `sqlx::raw_sql`, so the server sees the text exactly
//! as typed (text protocol, no prepared statements) and every value arrives as
//! text that can be shown without type-specific decoding.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mysqlc_core::{QueryOutcome, ResultSet, starts_with_verb};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Either, Executor, Row, ValueRef};

use crate::error::StorageError;
use crate::traits::{ConnectParams, Connector, Database};

/// Verbs whose statements answer with a result set, even an empty one.
const RESULT_SET_VERBS: &[&str] = &["SELECT", "SHOW", "DESC", "DESCRIBE", "EXPLAIN"];

/// Opens MySQL sessions with autocommit disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    type Conn = MySqlSession;

    async fn connect(&self, params: &ConnectParams) -> Result<MySqlSession, StorageError> {
        let mut options = MySqlConnectOptions::new().host(&params.host).port(params.port);
        if let Some(user) = &params.user {
            options = options.username(user);
        }
        if let Some(password) = &params.password {
            options = options.password(password);
        }
        if let Some(database) = &params.database {
            options = options.database(database);
        }

        let mut conn = MySqlConnection::connect_with(&options).await?;
        Executor::execute(&mut conn, sqlx::raw_sql("SET autocommit = 0")).await?;
        tracing::info!(host = %params.host, port = params.port, "connected to MySQL");
        Ok(MySqlSession { conn: Some(conn) })
    }
}

/// A single MySQL connection.
#[derive(Debug)]
pub struct MySqlSession {
    conn: Option<MySqlConnection>,
}

impl MySqlSession {
    fn conn(&mut self) -> Result<&mut MySqlConnection, StorageError> {
        self.conn.as_mut().ok_or(StorageError::Closed)
    }
}

fn cell_text(row: &MySqlRow, index: usize) -> Result<Option<String>, StorageError> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(None);
    }
    let bytes: Vec<u8> = row.try_get_unchecked(index)?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn row_cells(row: &MySqlRow) -> Result<Vec<Option<String>>, StorageError> {
    (0..row.columns().len()).map(|i| cell_text(row, i)).collect()
}

#[async_trait]
impl Database for MySqlSession {
    async fn execute(&mut self, sql: &str) -> Result<QueryOutcome, StorageError> {
        tracing::debug!(sql, "executing statement");
        let conn = self.conn()?;
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        let mut affected: u64 = 0;

        let mut stream = sqlx::raw_sql(sql).fetch_many(&mut *conn);
        while let Some(step) = stream.try_next().await? {
            match step {
                Either::Left(done) => affected = affected.saturating_add(done.rows_affected()),
                Either::Right(row) => {
                    if columns.is_empty() {
                        columns = row.columns().iter().map(|c| c.name().to_owned()).collect();
                    }
                    rows.push(row_cells(&row)?);
                },
            }
        }

        // A result set with zero rows carries no column metadata through the
        // stream; fall back to the verb to tell "Empty set" from "Query OK".
        if rows.is_empty() && !starts_with_verb(sql, RESULT_SET_VERBS) {
            return Ok(QueryOutcome::Affected { rows: affected });
        }
        Ok(QueryOutcome::Rows(ResultSet::new(columns, rows)))
    }

    async fn ping(&mut self) -> Result<(), StorageError> {
        self.conn()?.ping().await?;
        Ok(())
    }

    async fn current_database(&mut self) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        let row = Executor::fetch_one(&mut *conn, sqlx::raw_sql("SELECT DATABASE()")).await?;
        cell_text(&row, 0)
    }

    async fn commit(&mut self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        Executor::execute(&mut *conn, sqlx::raw_sql("COMMIT")).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
            tracing::info!("MySQL connection closed");
        }
        Ok(())
    }
}
