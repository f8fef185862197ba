//! One interactive session: classify a line, act on it, report what happened.

use std::time::{Duration, Instant};

use mysqlc_core::{
    Command, HISTORY_LIST_LIMIT, HistorySelector, QueryOutcome, classify, starts_with_verb,
};
use mysqlc_llm::{ChatModel, Translation, Translator};
use mysqlc_storage::{
    ConnectionManager, Connector, Database, HistoryEntry, HistoryStore, SchemaCache, StorageError,
};

use crate::error::ServiceError;

/// Something the front end should show after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Output of the `history` command, ascending by row id.
    HistoryListing(Vec<HistoryEntry>),
    /// A history entry about to be executed again.
    Replaying(String),
    /// SQL produced by the model, about to be executed.
    Translated(String),
    /// A model reply that held no executable statement.
    Answer(String),
    Executed { outcome: QueryOutcome, elapsed: Duration },
    Notice(String),
    Warning(String),
    Exit,
}

pub struct Session<C: Connector, M: ChatModel> {
    connection: ConnectionManager<C>,
    schema: SchemaCache,
    translator: Option<Translator<M>>,
    history: HistoryStore,
    current_database: Option<String>,
}

impl<C: Connector, M: ChatModel> Session<C, M> {
    /// Build a session. `translator` is `None` when no model is configured.
    #[must_use]
    pub fn new(
        connection: ConnectionManager<C>,
        history: HistoryStore,
        translator: Option<Translator<M>>,
    ) -> Self {
        let current_database = connection.params().database.clone();
        Self { connection, schema: SchemaCache::new(), translator, history, current_database }
    }

    /// Open the connection and learn which database is selected.
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        self.connection.connect().await?;
        self.sync_database().await
    }

    #[must_use]
    pub fn current_database(&self) -> Option<&str> {
        self.current_database.as_deref()
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaCache {
        &self.schema
    }

    #[must_use]
    pub fn translator(&self) -> Option<&Translator<M>> {
        self.translator.as_ref()
    }

    #[must_use]
    pub fn translation_enabled(&self) -> bool {
        self.translator.is_some()
    }

    /// Ask the server for the selected database and remember it for reconnects.
    pub async fn sync_database(&mut self) -> Result<(), ServiceError> {
        let current = self.connection.current_database().await?;
        if current != self.current_database {
            tracing::info!(database = ?current, "database changed");
            self.current_database.clone_from(&current);
        }
        self.connection.set_database(current);
        Ok(())
    }

    async fn refresh_schema(&mut self) -> Result<(), ServiceError> {
        self.sync_database().await?;
        self.schema.refresh_if_stale(&mut self.connection, self.current_database.as_deref()).await?;
        Ok(())
    }

    /// Handle one logical input line.
    ///
    /// Failures never end the session; they come back as
    /// [`SessionEvent::Warning`]s.
    pub async fn handle_line(&mut self, line: &str) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        match classify(line) {
            Command::Ignore => {},
            Command::Exit => events.push(SessionEvent::Exit),
            Command::ListHistory => {
                events.push(SessionEvent::HistoryListing(self.history.recent(HISTORY_LIST_LIMIT)));
            },
            Command::HistoryReplay(selector) => self.replay(&selector, &mut events).await,
            Command::DirectSql(sql) => self.execute(&sql, &mut events).await,
            Command::TranslationRequest(question) => self.translate(&question, &mut events).await,
        }
        events
    }

    async fn replay(&mut self, selector: &HistorySelector, events: &mut Vec<SessionEvent>) {
        let found = match selector {
            HistorySelector::Id(id) => self.history.get(*id).map(str::to_owned),
            HistorySelector::Prefix(prefix) if prefix.is_empty() => None,
            HistorySelector::Prefix(prefix) => {
                self.history.find_latest_by_prefix(prefix).map(|entry| entry.text)
            },
        };
        let Some(text) = found else {
            let message = match selector {
                HistorySelector::Prefix(prefix) if !prefix.is_empty() => "No matching command found.",
                _ => "Invalid history command.",
            };
            events.push(SessionEvent::Warning(message.to_owned()));
            return;
        };

        events.push(SessionEvent::Replaying(text.clone()));
        self.execute(&text, events).await;
    }

    async fn translate(&mut self, question: &str, events: &mut Vec<SessionEvent>) {
        if question.is_empty() {
            let err = ServiceError::InvalidInput("nothing to translate".to_owned());
            events.push(SessionEvent::Warning(format!("Error: {err}")));
            return;
        }
        if self.translator.is_none() {
            let err = ServiceError::NotConfigured(
                "translation unavailable, set GEMINI_API_KEY or pass -g".to_owned(),
            );
            events.push(SessionEvent::Warning(format!("Error: {err}")));
            return;
        }
        if let Err(e) = self.refresh_schema().await {
            events.push(SessionEvent::Warning(format!("Error: {e}")));
            return;
        }

        let schema = self.schema.description().to_string();
        let Some(translator) = self.translator.as_mut() else {
            return;
        };
        match translator.translate(question, &schema).await {
            Ok(Translation::Sql(sql)) => {
                events.push(SessionEvent::Translated(sql.clone()));
                self.execute(&sql, events).await;
            },
            Ok(Translation::Answer(text)) => events.push(SessionEvent::Answer(text)),
            Err(e) => {
                tracing::warn!("translation failed: {e}");
                events.push(SessionEvent::Warning(format!("Error: {}", ServiceError::from(e))));
            },
        }
    }

    async fn run_statement(&mut self, sql: &str) -> Result<QueryOutcome, StorageError> {
        tracing::debug!(sql, "executing");
        let outcome = self.connection.execute(sql).await?;
        self.connection.commit().await?;
        Ok(outcome)
    }

    /// Execute, commit and record one statement.
    async fn execute(&mut self, sql: &str, events: &mut Vec<SessionEvent>) {
        let reconnects = self.connection.reconnects();
        let started = Instant::now();
        let result = self.run_statement(sql).await;
        let elapsed = started.elapsed();

        if self.connection.reconnects() > reconnects {
            events.push(SessionEvent::Notice(
                "Connection to the server was lost. Reconnected.".to_owned(),
            ));
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                events.push(SessionEvent::Warning(format!("Error: {e}")));
                return;
            },
        };
        events.push(SessionEvent::Executed { outcome, elapsed });

        if let Err(e) = self.history.append(sql) {
            tracing::warn!("could not record history: {e}");
            events.push(SessionEvent::Warning(format!("Error: {e}")));
        }

        if starts_with_verb(sql, &["USE"])
            && let Err(e) = self.sync_database().await
        {
            events.push(SessionEvent::Warning(format!("Error: {e}")));
        }
    }

    /// Close the database connection. Safe to call more than once.
    pub async fn close(&mut self) -> Result<(), ServiceError> {
        self.connection.close().await?;
        Ok(())
    }
}
