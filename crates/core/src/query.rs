/// Rows returned by a statement, stringified by the driver.
///
/// `None` cells are SQL NULLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the values of one column, skipping NULLs.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index).and_then(|c| c.as_deref()))
    }
}

/// What a statement produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// A result set, possibly empty.
    Rows(ResultSet),
    /// A statement without a result set.
    Affected { rows: u64 },
}

impl QueryOutcome {
    /// Result rows, or `None` for statements that return no result set.
    #[must_use]
    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            Self::Rows(set) => Some(set),
            Self::Affected { .. } => None,
        }
    }
}
