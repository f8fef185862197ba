//! Natural-language question → single executable SQL statement.

use mysqlc_core::{READ_ONLY_VERBS, Transcript, starts_with_verb};

use crate::chat::ChatModel;
use crate::error::LlmError;
use crate::model_select::{DEFAULT_MODEL_FAMILY, select_model};

/// What the model's reply boiled down to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// A read-only statement safe to execute.
    Sql(String),
    /// Nothing executable; the text is shown to the user instead.
    Answer(String),
}

fn role_prompt(schema: &str, question: &str) -> String {
    let schema = if schema.trim().is_empty() { "(no tables)" } else { schema };
    format!(
        r#"You are a MySQL query assistant. You translate questions into MySQL queries.

Rules:
1. Respond with exactly one MySQL query, written on a single line.
2. If a question is not about the database, do not refuse: answer it with a SELECT of a literal value, for example SELECT 'New Delhi';
3. Keep the case of table and column names exactly as written in the schema.

Schema (one table per line, as table(column type, ...)):
{schema}

Question: {question}"#
    )
}

fn schema_notice(schema: &str, question: &str) -> String {
    let schema = if schema.trim().is_empty() { "(no tables)" } else { schema };
    format!(
        "Note: the database schema has changed. Use this schema from now on:\n{schema}\n\nQuestion: {question}"
    )
}

/// Strip markdown code fencing from a reply line.
///
/// Fence lines (```` ``` ```` or ```` ```sql ````) become empty. A line wrapped
/// in one pair of backticks loses them; backticks inside a line are kept so
/// quoted identifiers survive.
fn unfence(line: &str) -> &str {
    let line = line.trim();
    if let Some(inner) = line.strip_prefix("```") {
        return inner.strip_suffix("```").map_or("", str::trim);
    }
    match line.strip_prefix('`').and_then(|rest| rest.strip_suffix('`')) {
        Some(inner) if !inner.contains('`') => inner.trim(),
        _ => line,
    }
}

/// Pick the first read-only statement out of a model reply.
///
/// Lines are scanned top to bottom; the first one starting with a
/// read-only verb wins. With no such line the last non-empty line comes
/// back as an [`Translation::Answer`].
#[must_use]
pub fn extract_sql(reply: &str) -> Translation {
    let mut last = "";
    for line in reply.lines() {
        let line = unfence(line);
        if line.is_empty() {
            continue;
        }
        if starts_with_verb(line, READ_ONLY_VERBS) {
            return Translation::Sql(line.to_owned());
        }
        last = line;
    }
    Translation::Answer(last.to_owned())
}

/// Drives translation for one interactive session.
///
/// Owns the conversation so follow-up questions can refer to earlier ones,
/// and resolves the model name once, on first use.
pub struct Translator<M: ChatModel> {
    model: M,
    family: String,
    selected: Option<String>,
    transcript: Transcript,
    last_schema: Option<String>,
}

impl<M: ChatModel> std::fmt::Debug for Translator<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("family", &self.family)
            .field("selected", &self.selected)
            .field("exchanges", &self.transcript.exchanges())
            .finish_non_exhaustive()
    }
}

impl<M: ChatModel> Translator<M> {
    #[must_use]
    pub fn new(model: M) -> Self {
        Self {
            model,
            family: DEFAULT_MODEL_FAMILY.to_owned(),
            selected: None,
            transcript: Transcript::new(),
            last_schema: None,
        }
    }

    /// Restrict model selection to names starting with `family`.
    #[must_use]
    pub fn with_family(mut self, family: String) -> Self {
        self.family = family;
        self
    }

    /// Use `model` without consulting the provider listing.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.selected = Some(model);
        self
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn selected_model(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    async fn resolve_model(&mut self) -> Result<String, LlmError> {
        if let Some(model) = &self.selected {
            return Ok(model.clone());
        }
        let available = self.model.list_models().await?;
        let model = select_model(&available, &self.family)
            .ok_or_else(|| LlmError::NoModel { family: self.family.clone() })?;
        tracing::info!(model = %model, candidates = available.len(), "selected translation model");
        self.selected = Some(model.clone());
        Ok(model)
    }

    /// The message that would be sent for `question` given `schema`.
    #[must_use]
    pub fn outbound_message(&self, question: &str, schema: &str) -> String {
        if self.transcript.is_empty() {
            role_prompt(schema, question)
        } else if self.last_schema.as_deref() != Some(schema) {
            schema_notice(schema, question)
        } else {
            question.to_owned()
        }
    }

    /// Ask the model for a statement answering `question`.
    ///
    /// The exchange is added to the transcript only when the model replied.
    ///
    /// # Errors
    /// Returns an error if no model is available or the model call fails.
    pub async fn translate(&mut self, question: &str, schema: &str) -> Result<Translation, LlmError> {
        let model = self.resolve_model().await?;
        let message = self.outbound_message(question, schema);
        let reply = self.model.send_message(&model, self.transcript.turns(), &message).await?;
        tracing::debug!(reply = %reply, "model reply");

        let translation = extract_sql(&reply);
        self.transcript.push_exchange(message, reply);
        self.last_schema = Some(schema.to_owned());
        Ok(translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mysqlc_core::{Role, Turn};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        list_calls: usize,
        sent: Vec<(String, Vec<Turn>, String)>,
        replies: VecDeque<Result<String, LlmError>>,
    }

    #[derive(Clone)]
    struct FakeModel {
        models: Vec<String>,
        calls: Arc<Mutex<Calls>>,
    }

    impl FakeModel {
        fn new(models: &[&str], replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                models: models.iter().map(|m| (*m).to_owned()).collect(),
                calls: Arc::new(Mutex::new(Calls { replies: replies.into(), ..Calls::default() })),
            }
        }
    }

    #[async_trait]
    impl ChatModel for FakeModel {
        async fn list_models(&self) -> Result<Vec<String>, LlmError> {
            self.calls.lock().unwrap().list_calls += 1;
            Ok(self.models.clone())
        }

        async fn send_message(
            &self,
            model: &str,
            transcript: &[Turn],
            message: &str,
        ) -> Result<String, LlmError> {
            let mut calls = self.calls.lock().unwrap();
            calls.sent.push((model.to_owned(), transcript.to_vec(), message.to_owned()));
            calls.replies.pop_front().unwrap_or_else(|| Ok("SELECT 1;".to_owned()))
        }
    }

    const SCHEMA: &str = "users(id int, Name varchar(64))";

    #[test]
    fn test_extract_first_read_only_line() {
        let reply = "Here is your answer:\nSELECT 'New Delhi';\nHope that helps";
        assert_eq!(extract_sql(reply), Translation::Sql("SELECT 'New Delhi';".to_owned()));
    }

    #[test]
    fn test_extract_is_case_insensitive_and_strips_fences() {
        let reply = "```sql\nshow tables;\n```";
        assert_eq!(extract_sql(reply), Translation::Sql("show tables;".to_owned()));
        assert_eq!(extract_sql("`SELECT 2;`"), Translation::Sql("SELECT 2;".to_owned()));
    }

    #[test]
    fn test_extract_keeps_quoted_identifiers() {
        assert_eq!(
            extract_sql("SELECT * FROM `users`"),
            Translation::Sql("SELECT * FROM `users`".to_owned())
        );
        let reply = "```sql\nSELECT `id`, `name` FROM `users` WHERE `id` = 1;\n```";
        assert_eq!(
            extract_sql(reply),
            Translation::Sql("SELECT `id`, `name` FROM `users` WHERE `id` = 1;".to_owned())
        );
        assert_eq!(
            extract_sql("```SELECT `a` FROM `t````"),
            Translation::Sql("SELECT `a` FROM `t`".to_owned())
        );
    }

    #[test]
    fn test_extract_refuses_mutating_statements() {
        let reply = "DELETE FROM users;\nThat removes everyone.";
        assert_eq!(extract_sql(reply), Translation::Answer("That removes everyone.".to_owned()));
    }

    #[test]
    fn test_extract_without_lines() {
        assert_eq!(extract_sql(""), Translation::Answer(String::new()));
    }

    #[tokio::test]
    async fn test_first_turn_uses_role_template() {
        let model = FakeModel::new(&["gemini-2.0-flash"], vec![Ok("SELECT COUNT(*) FROM users;".to_owned())]);
        let mut translator = Translator::new(model.clone());

        let result = translator.translate("how many users", SCHEMA).await.unwrap();
        assert_eq!(result, Translation::Sql("SELECT COUNT(*) FROM users;".to_owned()));

        let calls = model.calls.lock().unwrap();
        let (used_model, history, message) = calls.sent.first().unwrap();
        assert_eq!(used_model, "gemini-2.0-flash");
        assert!(history.is_empty());
        assert!(message.starts_with("You are a MySQL query assistant."));
        assert!(message.contains(SCHEMA));
        assert!(message.ends_with("Question: how many users"));
    }

    #[tokio::test]
    async fn test_follow_up_is_sent_raw_with_history() {
        let model = FakeModel::new(&["gemini-2.0-flash"], vec![]);
        let mut translator = Translator::new(model.clone());

        translator.translate("how many users", SCHEMA).await.unwrap();
        translator.translate("and how many orders", SCHEMA).await.unwrap();

        let calls = model.calls.lock().unwrap();
        let (_, history, message) = calls.sent.get(1).unwrap();
        assert_eq!(message, "and how many orders");
        assert_eq!(history.len(), 2);
        assert_eq!(history.first().map(|t| t.role), Some(Role::User));
        assert_eq!(history.get(1).map(|t| t.role), Some(Role::Model));
        assert_eq!(translator.transcript().exchanges(), 2);
    }

    #[tokio::test]
    async fn test_schema_change_injects_notice() {
        let model = FakeModel::new(&["gemini-2.0-flash"], vec![]);
        let mut translator = Translator::new(model.clone());

        translator.translate("how many users", SCHEMA).await.unwrap();
        translator.translate("list invoices", "invoices(id int)").await.unwrap();

        let calls = model.calls.lock().unwrap();
        let (_, _, message) = calls.sent.get(1).unwrap();
        assert!(message.starts_with("Note: the database schema has changed."));
        assert!(message.contains("invoices(id int)"));
        assert!(message.ends_with("Question: list invoices"));
    }

    #[tokio::test]
    async fn test_model_is_resolved_once() {
        let model = FakeModel::new(&["gemini-1.5-pro", "gemini-2.0-flash", "gemini-2.0-flash-exp"], vec![]);
        let mut translator = Translator::new(model.clone());

        translator.translate("q1", SCHEMA).await.unwrap();
        translator.translate("q2", SCHEMA).await.unwrap();

        assert_eq!(translator.selected_model(), Some("gemini-2.0-flash"));
        assert_eq!(model.calls.lock().unwrap().list_calls, 1);
    }

    #[tokio::test]
    async fn test_pinned_model_skips_listing() {
        let model = FakeModel::new(&[], vec![]);
        let mut translator = Translator::new(model.clone()).with_model("my-model".to_owned());

        translator.translate("q", SCHEMA).await.unwrap();

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.list_calls, 0);
        assert_eq!(calls.sent.first().map(|s| s.0.as_str()), Some("my-model"));
    }

    #[tokio::test]
    async fn test_no_model_available_is_an_error() {
        let model = FakeModel::new(&["gemini-exp-1206"], vec![]);
        let mut translator = Translator::new(model.clone());

        let err = translator.translate("q", SCHEMA).await.unwrap_err();
        assert!(matches!(err, LlmError::NoModel { .. }));
        assert!(translator.transcript().is_empty());
        assert!(model.calls.lock().unwrap().sent.is_empty());
    }

    #[tokio::test]
    async fn test_failed_call_leaves_transcript_untouched() {
        let model = FakeModel::new(
            &["gemini-2.0-flash"],
            vec![Err(LlmError::Status { status: 401, body: "Unauthorized".to_owned() })],
        );
        let mut translator = Translator::new(model.clone());

        assert!(translator.translate("q", SCHEMA).await.is_err());
        assert!(translator.transcript().is_empty());

        // the next question is still a first turn
        translator.translate("q", SCHEMA).await.unwrap();
        let calls = model.calls.lock().unwrap();
        let (_, _, message) = calls.sent.get(1).unwrap();
        assert!(message.starts_with("You are a MySQL query assistant."));
    }

    #[tokio::test]
    async fn test_answer_is_recorded_in_transcript() {
        let model = FakeModel::new(&["gemini-2.0-flash"], vec![Ok("I cannot help with that.".to_owned())]);
        let mut translator = Translator::new(model);

        let result = translator.translate("drop everything", SCHEMA).await.unwrap();
        assert_eq!(result, Translation::Answer("I cannot help with that.".to_owned()));
        assert_eq!(translator.transcript().exchanges(), 1);
    }
}
