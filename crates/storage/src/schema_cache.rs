//! Introspection of the selected database, cached per database name.

use mysqlc_core::{SchemaDescription, TableSchema};

use crate::error::StorageError;
use crate::traits::Database;

/// Quote an identifier for MySQL.
fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Read every table and its columns, in server order.
///
/// # Errors
/// Returns the first failing introspection statement's error.
pub async fn introspect<D: Database + ?Sized>(db: &mut D) -> Result<SchemaDescription, StorageError> {
    let tables = db.execute("SHOW TABLES").await?;
    let table_names: Vec<String> = tables
        .result_set()
        .map(|set| set.column_values(0).map(str::to_owned).collect())
        .unwrap_or_default();

    let mut described = Vec::with_capacity(table_names.len());
    for name in table_names {
        let outcome = db.execute(&format!("SHOW COLUMNS FROM {}", quote_ident(&name))).await?;
        let columns = match outcome.result_set() {
            Some(set) => {
                let field = set.column_index("Field").unwrap_or(0);
                let kind = set.column_index("Type").unwrap_or(1);
                set.rows
                    .iter()
                    .filter_map(|row| {
                        let column = row.get(field)?.clone()?;
                        let column_type = row.get(kind).cloned().flatten().unwrap_or_default();
                        Some((column, column_type))
                    })
                    .collect()
            },
            None => Vec::new(),
        };
        described.push(TableSchema { name, columns });
    }
    Ok(SchemaDescription::new(described))
}

/// Schema of the database the session was last seen in.
#[derive(Debug, Default)]
pub struct SchemaCache {
    /// `None` until the first refresh; then the database it was computed for.
    tracked: Option<Option<String>>,
    description: SchemaDescription,
    refreshes: u64,
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn description(&self) -> &SchemaDescription {
        &self.description
    }

    /// Database the cached description belongs to.
    #[must_use]
    pub fn tracked_database(&self) -> Option<&str> {
        self.tracked.as_ref().and_then(|db| db.as_deref())
    }

    /// How many times the description was recomputed.
    #[must_use]
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }

    /// Recompute the description if `current` differs from the tracked database.
    ///
    /// Returns `true` when a refresh happened. With no database selected the
    /// description becomes empty without querying the server.
    ///
    /// # Errors
    /// Returns the introspection error; the cache keeps its previous state so
    /// the next call tries again.
    pub async fn refresh_if_stale<D: Database + ?Sized>(
        &mut self,
        db: &mut D,
        current: Option<&str>,
    ) -> Result<bool, StorageError> {
        if self.tracked.as_ref().is_some_and(|tracked| tracked.as_deref() == current) {
            return Ok(false);
        }

        let description = match current {
            Some(_) => introspect(db).await?,
            None => SchemaDescription::default(),
        };
        tracing::debug!(database = ?current, tables = description.tables.len(), "schema refreshed");
        self.description = description;
        self.tracked = Some(current.map(str::to_owned));
        self.refreshes = self.refreshes.saturating_add(1);
        Ok(true)
    }
}
