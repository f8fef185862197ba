//! Row-addressable command history persisted as a plain-text log.
//!
//! File format, one block per entry:
//!
//! ```text
//! # row 12 2026-10-17T09:30:00+00:00
//! +SELECT id, name
//! +FROM users
//! ```
//!
//! A `+` line continues the open entry, blank and `#` lines close it, any
//! other non-empty line starts a new entry on its own. The `row` header is
//! optional; entries without one take the next free id.
//!
//! A rewritten file starts with `# last <id>`, the highest id ever handed
//! out, so ids of pruned entries stay retired across restarts.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::Utc;
use mysqlc_core::{COMMENT_MARKER, CONTINUATION_MARKER};

use crate::error::StorageError;

/// One stored command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: u64,
    pub text: String,
}

/// In-memory history mirrored to a file after every append.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: BTreeMap<u64, String>,
    /// Highest id ever assigned, including pruned entries.
    last_id: u64,
}

impl HistoryStore {
    /// Load the history file. A missing file yields an empty store.
    ///
    /// # Errors
    /// Returns an error only if the file exists but cannot be read.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let ParsedHistory { entries, last_id } = parse_bytes(&bytes);
        tracing::debug!(path = %path.display(), entries = entries.len(), "history loaded");
        Ok(Self { path, entries, last_id })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of every entry keyed by row id.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<u64, String> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Most recent entry whose text starts with `prefix`, ignoring case.
    #[must_use]
    pub fn find_latest_by_prefix(&self, prefix: &str) -> Option<HistoryEntry> {
        let needle = prefix.to_lowercase();
        self.entries
            .iter()
            .rev()
            .find(|(_, text)| text.to_lowercase().starts_with(&needle))
            .map(|(id, text)| HistoryEntry { id: *id, text: text.clone() })
    }

    /// Last `limit` entries in ascending row id order.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries
            .iter()
            .skip(skip)
            .map(|(id, text)| HistoryEntry { id: *id, text: text.clone() })
            .collect()
    }

    /// Record a command and append it to the file.
    ///
    /// # Errors
    /// Returns an error if the entry cannot be written. The in-memory entry
    /// is kept so the session stays usable.
    pub fn append(&mut self, text: &str) -> Result<u64, StorageError> {
        let text = text.trim().to_owned();
        let id = self.last_id.saturating_add(1);
        self.last_id = id;
        let block = format_entry(id, &text);
        self.entries.insert(id, text);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(block.as_bytes())?;
        Ok(id)
    }

    /// Rewrite the whole file from memory.
    ///
    /// # Errors
    /// Returns an error if the temporary file cannot be written or renamed.
    pub fn persist(&self) -> Result<(), StorageError> {
        let mut out = format!("{COMMENT_MARKER} last {}\n", self.last_id);
        for (id, text) in &self.entries {
            out.push_str(&format_entry(*id, text));
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, out)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Drop the oldest entries so at most `keep` remain, then persist.
    ///
    /// Returns the number of entries removed. Ids of removed entries are
    /// never handed out again.
    ///
    /// # Errors
    /// Returns an error if the file cannot be rewritten.
    pub fn prune(&mut self, keep: usize) -> Result<usize, StorageError> {
        let excess = self.entries.len().saturating_sub(keep);
        if excess == 0 {
            return Ok(0);
        }
        let cutoff: Vec<u64> = self.entries.keys().take(excess).copied().collect();
        for id in &cutoff {
            self.entries.remove(id);
        }
        self.persist()?;
        tracing::info!(removed = excess, kept = self.entries.len(), "history pruned");
        Ok(excess)
    }
}

fn format_entry(id: u64, text: &str) -> String {
    let mut block = format!("\n{COMMENT_MARKER} row {id} {}\n", Utc::now().to_rfc3339());
    for line in text.lines() {
        block.push(CONTINUATION_MARKER);
        block.push_str(line);
        block.push('\n');
    }
    block
}

enum Header {
    Row(u64),
    Last(u64),
}

fn parse_header(comment: &str) -> Option<Header> {
    let mut words = comment.split_whitespace();
    match (words.next(), words.next()) {
        (Some("row"), Some(id)) => id.parse().ok().map(Header::Row),
        (Some("last"), Some(id)) => id.parse().ok().map(Header::Last),
        _ => None,
    }
}

/// Parsed history file: entries plus the id high-water mark.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedHistory {
    pub entries: BTreeMap<u64, String>,
    /// Highest id seen in a `row` or `last` header, never below the largest entry id.
    pub last_id: u64,
}

#[derive(Default)]
struct Parser {
    entries: BTreeMap<u64, String>,
    last_id: u64,
    recorded_last: u64,
    pending_id: Option<u64>,
    open: Option<String>,
    corrupt: bool,
}

impl Parser {
    fn feed(&mut self, raw: &str) {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            self.close();
            self.pending_id = None;
        } else if let Some(comment) = line.trim_start().strip_prefix(COMMENT_MARKER) {
            self.close();
            self.pending_id = None;
            match parse_header(comment) {
                Some(Header::Row(id)) => self.pending_id = Some(id),
                Some(Header::Last(id)) => self.recorded_last = self.recorded_last.max(id),
                None => {},
            }
        } else if let Some(rest) = line.strip_prefix(CONTINUATION_MARKER) {
            match self.open.as_mut() {
                Some(open) => {
                    open.push('\n');
                    open.push_str(rest);
                },
                None => self.open = Some(rest.to_owned()),
            }
        } else {
            self.close();
            self.open = Some(line.to_owned());
        }
    }

    fn close(&mut self) {
        let Some(text) = self.open.take() else {
            return;
        };
        let text = text.trim().to_owned();
        let pending = self.pending_id.take();
        if std::mem::take(&mut self.corrupt) {
            tracing::warn!(id = pending, "dropping history entry with invalid UTF-8");
            return;
        }
        if text.is_empty() {
            tracing::warn!("dropping empty history fragment");
            return;
        }
        let id = match pending {
            Some(id) if id > self.last_id => id,
            Some(id) => {
                tracing::warn!(id, last = self.last_id, "out-of-order history row id, renumbering");
                self.last_id.saturating_add(1)
            },
            None => self.last_id.saturating_add(1),
        };
        self.last_id = id;
        self.entries.insert(id, text);
    }

    fn finish(mut self) -> ParsedHistory {
        self.close();
        ParsedHistory { last_id: self.last_id.max(self.recorded_last), entries: self.entries }
    }
}

/// Parse history file contents into row id → command text.
#[must_use]
pub fn parse_history(contents: &str) -> ParsedHistory {
    let mut parser = Parser::default();
    for line in contents.lines() {
        parser.feed(line);
    }
    parser.finish()
}

/// Decodes line by line; an entry with invalid UTF-8 anywhere in it is dropped.
fn parse_bytes(bytes: &[u8]) -> ParsedHistory {
    let mut parser = Parser::default();
    for raw in bytes.split(|b| *b == b'\n') {
        let line = String::from_utf8_lossy(raw);
        parser.feed(&line);
        if matches!(line, Cow::Owned(_)) && parser.open.is_some() {
            parser.corrupt = true;
        }
    }
    parser.finish()
}
