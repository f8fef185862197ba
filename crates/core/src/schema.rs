use std::fmt;

/// Columns of one table in the order the server reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    /// (column name, column type)
    pub columns: Vec<(String, String)>,
}

/// Tables of the current database, in server order.
///
/// Displayed one table per line as `name(col type, col type)`, which is the
/// form embedded into translation prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDescription {
    pub tables: Vec<TableSchema>,
}

impl SchemaDescription {
    #[must_use]
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (column, column_type)) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{column} {column_type}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for SchemaDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, table) in self.tables.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{table}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, columns: &[(&str, &str)]) -> TableSchema {
        TableSchema {
            name: name.to_owned(),
            columns: columns.iter().map(|(c, t)| ((*c).to_owned(), (*t).to_owned())).collect(),
        }
    }

    #[test]
    fn test_display_keeps_column_order() {
        let schema = SchemaDescription::new(vec![
            table("users", &[("id", "int"), ("Name", "varchar(64)")]),
            table("orders", &[("user_id", "int"), ("total", "decimal(10,2)")]),
        ]);
        assert_eq!(
            schema.to_string(),
            "users(id int, Name varchar(64))\norders(user_id int, total decimal(10,2))"
        );
    }

    #[test]
    fn test_empty_schema_is_valid() {
        let schema = SchemaDescription::default();
        assert!(schema.is_empty());
        assert_eq!(schema.to_string(), "");
    }

    #[test]
    fn test_table_without_columns() {
        let schema = SchemaDescription::new(vec![table("t", &[])]);
        assert!(!schema.is_empty());
        assert_eq!(schema.to_string(), "t()");
    }
}
