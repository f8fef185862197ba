//! The read-eval-print loop.

use std::path::Path;

use anyhow::Result;
use mysqlc_core::{render_table, summary_line};
use mysqlc_llm::ChatModel;
use mysqlc_service::{Session, SessionEvent};
use mysqlc_storage::Connector;
use rustyline::error::ReadlineError;

use crate::editor;

/// Text printed for one event, or `None` when the event ends the loop.
pub(crate) fn format_event(event: &SessionEvent) -> Option<String> {
    let text = match event {
        SessionEvent::HistoryListing(entries) => entries
            .iter()
            .map(|entry| format!("{}. {}", entry.id, entry.text))
            .collect::<Vec<_>>()
            .join("\n"),
        SessionEvent::Replaying(sql) => format!("Executing: {sql}"),
        SessionEvent::Translated(sql) => format!("Running: {sql}"),
        SessionEvent::Answer(text) if text.trim().is_empty() => {
            "No executable statement in the model reply.".to_owned()
        },
        SessionEvent::Answer(text) | SessionEvent::Notice(text) | SessionEvent::Warning(text) => {
            text.clone()
        },
        SessionEvent::Executed { outcome, elapsed } => {
            let table = outcome.result_set().map(render_table).unwrap_or_default();
            format!("{table}{}", summary_line(outcome, *elapsed))
        },
        SessionEvent::Exit => return None,
    };
    Some(text)
}

/// Read lines until exit, Ctrl-C or Ctrl-D.
///
/// The input history file is saved on every way out of the loop.
pub(crate) async fn run<C: Connector, M: ChatModel>(
    session: &mut Session<C, M>,
    highlight: bool,
    input_history: &Path,
) -> Result<()> {
    let mut line_editor = editor::build(highlight)?;
    if let Err(e) = line_editor.load_history(input_history) {
        tracing::debug!(path = %input_history.display(), "no input history loaded: {e}");
    }

    let outcome: Result<()> = 'repl: loop {
        let line = match line_editor.readline(&editor::prompt(session.current_database())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                println!("\nExiting...");
                break Ok(());
            },
            Err(e) => break Err(e.into()),
        };
        if !line.trim().is_empty()
            && let Err(e) = line_editor.add_history_entry(line.as_str())
        {
            tracing::warn!("could not record input history: {e}");
        }

        for event in session.handle_line(&line).await {
            match format_event(&event) {
                Some(text) if text.is_empty() => {},
                Some(text) => println!("{text}"),
                None => {
                    println!("Exiting...");
                    break 'repl Ok(());
                },
            }
        }
    };

    if let Err(e) = line_editor.save_history(input_history) {
        tracing::warn!(path = %input_history.display(), "could not save input history: {e}");
    }
    outcome
}
