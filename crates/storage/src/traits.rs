use async_trait::async_trait;
use mysqlc_core::{DEFAULT_MYSQL_HOST, DEFAULT_MYSQL_PORT, QueryOutcome};

use crate::error::StorageError;

/// Parameters used for the initial connection and every reconnect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl Default for ConnectParams {
    fn default() -> Self {
        Self {
            host: DEFAULT_MYSQL_HOST.to_owned(),
            port: DEFAULT_MYSQL_PORT,
            user: None,
            password: None,
            database: None,
        }
    }
}

impl std::fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .finish()
    }
}

/// One live database session.
#[async_trait]
pub trait Database: Send {
    /// Run one statement verbatim.
    async fn execute(&mut self, sql: &str) -> Result<QueryOutcome, StorageError>;

    /// Cheap liveness check.
    async fn ping(&mut self) -> Result<(), StorageError>;

    /// Name of the selected database, `None` when none is selected.
    async fn current_database(&mut self) -> Result<Option<String>, StorageError>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> Result<(), StorageError>;

    /// Close the session. Calling it again is a no-op.
    async fn close(&mut self) -> Result<(), StorageError>;
}

/// Opens database sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Database;

    async fn connect(&self, params: &ConnectParams) -> Result<Self::Conn, StorageError>;
}
