//! Syntactic routing of one logical input line.
//!
//! Only the leading keyword is ever inspected. Anything that does not start
//! with a recognized statement verb is treated as a natural-language question.

use regex::Regex;
use std::sync::LazyLock;

use crate::TRANSLATE_KEYWORD;

/// Verbs sent to the database as typed.
pub const DIRECT_VERBS: &[&str] = &[
    "SELECT", "USE", "SHOW", "DESC", "DESCRIBE", "UPDATE", "INSERT", "DELETE", "CREATE", "ALTER",
    "DROP",
];

/// Verbs a translated statement may start with. Mutating verbs are never
/// executed from model output.
pub const READ_ONLY_VERBS: &[&str] = &["SELECT", "USE", "SHOW", "DESC", "DESCRIBE"];

static LEADING_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Za-z_]+)").unwrap());

/// How a history replay addresses its entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySelector {
    /// `!12`
    Id(u64),
    /// `!sele`: most recent entry starting with the text, case-insensitively.
    Prefix(String),
}

/// Classification of one logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ignore,
    Exit,
    ListHistory,
    HistoryReplay(HistorySelector),
    DirectSql(String),
    TranslationRequest(String),
}

/// Returns the leading alphabetic keyword of `text`, if any.
#[must_use]
pub fn first_keyword(text: &str) -> Option<&str> {
    LEADING_KEYWORD.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Whether the leading keyword of `text` is one of `verbs` (case-insensitive).
#[must_use]
pub fn starts_with_verb(text: &str, verbs: &[&str]) -> bool {
    first_keyword(text).is_some_and(|kw| verbs.iter().any(|v| v.eq_ignore_ascii_case(kw)))
}

/// Classify a raw input line.
#[must_use]
pub fn classify(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Ignore;
    }

    let bare = trimmed.trim_end_matches(';').trim_end();
    if bare.eq_ignore_ascii_case("exit") || bare.eq_ignore_ascii_case("quit") {
        return Command::Exit;
    }

    if trimmed == "history" {
        return Command::ListHistory;
    }

    if let Some(rest) = trimmed.strip_prefix('!') {
        let rest = rest.trim();
        return match rest.parse::<u64>() {
            Ok(id) => Command::HistoryReplay(HistorySelector::Id(id)),
            Err(_) => Command::HistoryReplay(HistorySelector::Prefix(rest.to_owned())),
        };
    }

    classify_statement(trimmed)
}

/// `translate` prefix, then direct verbs, then the model.
fn classify_statement(text: &str) -> Command {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Command::Ignore;
    }

    if let Some(kw) = first_keyword(trimmed)
        && kw.eq_ignore_ascii_case(TRANSLATE_KEYWORD)
    {
        let question = trimmed.get(kw.len()..).unwrap_or("").trim();
        return Command::TranslationRequest(question.to_owned());
    }

    if starts_with_verb(trimmed, DIRECT_VERBS) {
        Command::DirectSql(trimmed.to_owned())
    } else {
        Command::TranslationRequest(trimmed.to_owned())
    }
}
