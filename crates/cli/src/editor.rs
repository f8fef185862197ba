//! Line editor setup and SQL keyword highlighting.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Cmd, Config, EditMode, Editor, EventHandler, Helper, KeyCode, KeyEvent, Modifiers};

const KEYWORDS: &[&str] = &[
    "ADD", "ALTER", "AND", "AS", "ASC", "BETWEEN", "BY", "CREATE", "DATABASE", "DATABASES",
    "DELETE", "DESC", "DESCRIBE", "DISTINCT", "DROP", "EXPLAIN", "FROM", "GROUP", "HAVING", "IN",
    "INDEX", "INNER", "INSERT", "INTO", "IS", "JOIN", "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "ON",
    "OR", "ORDER", "OUTER", "RIGHT", "SELECT", "SET", "SHOW", "TABLE", "TABLES", "TRANSLATE",
    "UNION", "UPDATE", "USE", "VALUES", "WHERE",
];

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

const KEYWORD_STYLE: &str = "\x1b[1;34m";
const RESET: &str = "\x1b[0m";

/// Colors SQL keywords when enabled; otherwise a no-op helper.
pub(crate) struct SqlHelper {
    highlight: bool,
}

impl SqlHelper {
    pub(crate) const fn new(highlight: bool) -> Self {
        Self { highlight }
    }
}

/// Wrap every SQL keyword in `line` in the keyword color.
pub(crate) fn highlight_keywords(line: &str) -> Cow<'_, str> {
    let is_keyword = |word: &str| KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word));
    if !WORD.find_iter(line).any(|m| is_keyword(m.as_str())) {
        return Cow::Borrowed(line);
    }
    let colored = WORD.replace_all(line, |caps: &regex::Captures<'_>| {
        let word = caps.get(0).map_or("", |m| m.as_str());
        if is_keyword(word) { format!("{KEYWORD_STYLE}{word}{RESET}") } else { word.to_owned() }
    });
    Cow::Owned(colored.into_owned())
}

impl Highlighter for SqlHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.highlight { highlight_keywords(line) } else { Cow::Borrowed(line) }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        self.highlight
    }
}

impl Completer for SqlHelper {
    type Candidate = String;
}

impl Hinter for SqlHelper {
    type Hint = String;
}

impl Validator for SqlHelper {}

impl Helper for SqlHelper {}

pub(crate) type SqlEditor = Editor<SqlHelper, DefaultHistory>;

/// Emacs bindings; Enter submits, Alt-Enter starts a new line, Tab indents.
pub(crate) fn build(highlight: bool) -> rustyline::Result<SqlEditor> {
    let config = Config::builder().edit_mode(EditMode::Emacs).auto_add_history(false).build();
    let mut editor: SqlEditor = Editor::with_config(config)?;
    editor.set_helper(Some(SqlHelper::new(highlight)));
    editor.bind_sequence(KeyEvent(KeyCode::Enter, Modifiers::ALT), EventHandler::Simple(Cmd::Newline));
    editor.bind_sequence(
        KeyEvent(KeyCode::Tab, Modifiers::NONE),
        EventHandler::Simple(Cmd::Insert(1, "  ".to_owned())),
    );
    Ok(editor)
}

/// `mysql [shop]> ` with a database selected, `mysql> ` otherwise.
pub(crate) fn prompt(database: Option<&str>) -> String {
    match database {
        Some(db) => format!("mysql [{db}]> "),
        None => "mysql> ".to_owned(),
    }
}
