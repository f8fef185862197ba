//! Typed error enum for the storage layer.
//!
//! Lets the connection manager tell a dropped server connection apart from
//! an ordinary statement failure without inspecting message text.

use thiserror::Error;

/// MySQL error numbers that mean the server connection is gone.
///
/// 1053 server shutdown, 2006 server has gone away, 2013 lost connection
/// during query, 4031 disconnected by server for inactivity.
const CONNECTION_LOST_ERRNOS: &[u16] = &[1053, 2006, 2013, 4031];

/// Storage-layer error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The server connection dropped; recoverable by reconnecting.
    #[error("server connection lost: {0}")]
    ConnectionLost(String),

    /// SQL / authentication / protocol failure.
    #[error("{0}")]
    Database(#[source] sqlx::Error),

    /// The session already closed its connection.
    #[error("connection closed")]
    Closed,

    /// History file I/O failure.
    #[error("history file error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Whether reconnecting can recover from this error.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::ConnectionLost(_))
    }
}

/// Hand-written `From<sqlx::Error>` instead of a blanket `#[from]`.
///
/// - socket failures and the server-gone error numbers → `ConnectionLost`
/// - everything else → `Database`
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(io) => Self::ConnectionLost(io.to_string()),
            sqlx::Error::WorkerCrashed => Self::ConnectionLost(err.to_string()),
            sqlx::Error::Database(db_err) => {
                let errno = db_err
                    .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
                    .map(sqlx::mysql::MySqlDatabaseError::number);
                if errno.is_some_and(|n| CONNECTION_LOST_ERRNOS.contains(&n)) {
                    Self::ConnectionLost(db_err.message().to_owned())
                } else {
                    Self::Database(err)
                }
            },
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_connection_lost() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = StorageError::from(sqlx::Error::Io(io));
        assert!(err.is_connection_lost());
    }

    #[test]
    fn test_protocol_error_is_not_connection_lost() {
        let err = StorageError::from(sqlx::Error::Protocol("bad packet".to_owned()));
        assert!(!err.is_connection_lost());
        assert!(err.to_string().contains("bad packet"));
    }

    #[test]
    fn test_history_io_is_not_connection_lost() {
        let err = StorageError::from(std::io::Error::other("disk full"));
        assert!(!err.is_connection_lost());
    }
}
