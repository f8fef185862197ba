//! Storage layer for mysqlc
//!
//! The persisted command history, the MySQL connection with transparent
//! reconnect, and schema introspection for translation prompts.

mod connection;
mod error;
mod history;
mod mysql;
mod schema_cache;
mod traits;

pub use connection::{ConnectionManager, ConnectionState, Pause, TokioPause};
pub use error::StorageError;
pub use history::{HistoryEntry, HistoryStore, ParsedHistory, parse_history};
pub use mysql::{MySqlConnector, MySqlSession};
pub use schema_cache::{SchemaCache, introspect};
pub use traits::{ConnectParams, Connector, Database};
