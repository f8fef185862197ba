//! Connection lifecycle with transparent reconnect.

use std::time::Duration;

use async_trait::async_trait;
use mysqlc_core::{DEFAULT_RECONNECT_DELAY_SECS, QueryOutcome};

use crate::error::StorageError;
use crate::traits::{ConnectParams, Connector, Database};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Lost,
    Reconnecting,
    Closed,
}

/// Waits between reconnect attempts.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, delay: Duration);
}

/// Real-time pause backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Owns the session's only database connection.
///
/// Implements [`Database`] itself: every call except `commit` checks
/// liveness first and reconnects with the last-known parameters when the
/// server went away.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    params: ConnectParams,
    conn: Option<C::Conn>,
    state: ConnectionState,
    retry_delay: Duration,
    pause: Box<dyn Pause>,
    reconnects: u64,
}

impl<C: Connector> std::fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("params", &self.params)
            .field("state", &self.state)
            .field("retry_delay", &self.retry_delay)
            .field("reconnects", &self.reconnects)
            .finish_non_exhaustive()
    }
}

impl<C: Connector> ConnectionManager<C> {
    #[must_use]
    pub fn new(connector: C, params: ConnectParams) -> Self {
        Self {
            connector,
            params,
            conn: None,
            state: ConnectionState::Disconnected,
            retry_delay: Duration::from_secs(DEFAULT_RECONNECT_DELAY_SECS),
            pause: Box::new(TokioPause),
            reconnects: 0,
        }
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[must_use]
    pub fn with_pause(mut self, pause: Box<dyn Pause>) -> Self {
        self.pause = pause;
        self
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    #[must_use]
    pub fn params(&self) -> &ConnectParams {
        &self.params
    }

    /// Number of successful reconnects so far.
    #[must_use]
    pub const fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Remember the selected database so a reconnect lands in it again.
    pub fn set_database(&mut self, database: Option<String>) {
        self.params.database = database;
    }

    /// Initial connect. Failures are returned as-is without retrying.
    ///
    /// # Errors
    /// Returns the connector's error, or `Closed` after [`Database::close`].
    pub async fn connect(&mut self) -> Result<(), StorageError> {
        if self.state == ConnectionState::Closed {
            return Err(StorageError::Closed);
        }
        let conn = self.connector.connect(&self.params).await?;
        self.conn = Some(conn);
        self.state = ConnectionState::Connected;
        Ok(())
    }

    /// Reconnect until it works or fails for a reason other than connection loss.
    async fn reconnect(&mut self) -> Result<(), StorageError> {
        self.conn = None;
        self.state = ConnectionState::Reconnecting;
        let mut attempt: u64 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            match self.connector.connect(&self.params).await {
                Ok(conn) => {
                    self.conn = Some(conn);
                    self.state = ConnectionState::Connected;
                    self.reconnects = self.reconnects.saturating_add(1);
                    tracing::info!(attempt, "reconnected to server");
                    return Ok(());
                },
                Err(e) if e.is_connection_lost() => {
                    tracing::warn!(attempt, delay = ?self.retry_delay, "reconnect failed: {e}");
                    self.pause.pause(self.retry_delay).await;
                },
                Err(e) => {
                    self.state = ConnectionState::Lost;
                    return Err(e);
                },
            }
        }
    }

    /// Make sure a live connection exists, reconnecting if needed.
    async fn ensure_live(&mut self) -> Result<&mut C::Conn, StorageError> {
        if self.state == ConnectionState::Closed {
            return Err(StorageError::Closed);
        }

        let alive = match self.conn.as_mut() {
            Some(conn) => match conn.ping().await {
                Ok(()) => true,
                Err(e) if e.is_connection_lost() => {
                    tracing::warn!("server connection lost: {e}");
                    false
                },
                Err(e) => return Err(e),
            },
            None => false,
        };

        if !alive {
            self.state = ConnectionState::Lost;
            self.reconnect().await?;
        }
        self.conn.as_mut().ok_or(StorageError::Closed)
    }
}

#[async_trait]
impl<C: Connector> Database for ConnectionManager<C> {
    async fn execute(&mut self, sql: &str) -> Result<QueryOutcome, StorageError> {
        let first = self.ensure_live().await?.execute(sql).await;
        match first {
            Err(e) if e.is_connection_lost() => {
                tracing::warn!("connection lost during statement, retrying once: {e}");
                self.state = ConnectionState::Lost;
                self.reconnect().await?;
                self.conn.as_mut().ok_or(StorageError::Closed)?.execute(sql).await
            },
            other => other,
        }
    }

    async fn ping(&mut self) -> Result<(), StorageError> {
        self.ensure_live().await.map(|_| ())
    }

    async fn current_database(&mut self) -> Result<Option<String>, StorageError> {
        self.ensure_live().await?.current_database().await
    }

    /// Commits on the connection that ran the statement. A lost connection
    /// is returned as an error; the next call reconnects.
    async fn commit(&mut self) -> Result<(), StorageError> {
        if self.state == ConnectionState::Closed {
            return Err(StorageError::Closed);
        }
        let Some(conn) = self.conn.as_mut() else {
            self.state = ConnectionState::Lost;
            return Err(StorageError::ConnectionLost("no open connection to commit on".to_owned()));
        };
        match conn.commit().await {
            Err(e) if e.is_connection_lost() => {
                tracing::warn!("connection lost before commit, pending work rolled back: {e}");
                self.conn = None;
                self.state = ConnectionState::Lost;
                Err(e)
            },
            other => other,
        }
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        if self.state == ConnectionState::Closed {
            return Ok(());
        }
        self.state = ConnectionState::Closed;
        match self.conn.take() {
            Some(mut conn) => conn.close().await,
            None => Ok(()),
        }
    }
}
