//! Shared constants for mysqlc.

/// Number of entries printed by the `history` command.
pub const HISTORY_LIST_LIMIT: usize = 100;

/// Default cap on persisted history entries before the oldest are pruned.
pub const DEFAULT_HISTORY_LIMIT: usize = 10_000;

/// File name of the command history log inside the home directory.
pub const HISTORY_FILE_NAME: &str = ".mysqlc.history";

/// File name of the line editor's input recall inside the home directory.
pub const INPUT_HISTORY_FILE_NAME: &str = ".mysqlc_input_history";

/// Marker that continues the previous history entry on a new line.
pub const CONTINUATION_MARKER: char = '+';

/// Marker that starts a comment line in the history file.
pub const COMMENT_MARKER: char = '#';

/// Default MySQL server port.
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Default MySQL host.
pub const DEFAULT_MYSQL_HOST: &str = "127.0.0.1";

/// Seconds to wait between reconnection attempts.
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 1;

/// Keyword that explicitly routes a line to the translation pipeline.
pub const TRANSLATE_KEYWORD: &str = "translate";
