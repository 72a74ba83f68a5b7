//! T-SQL rendering for the reporting table.
//!
//! Every identifier is bracket-quoted and every value is written as an
//! `N'...'` literal, so the script loads the strings exactly as produced.

use std::fmt;
use std::str::FromStr;

use aou_model::OutputRecord;

use crate::error::LoadError;

/// Schema assumed when the configured name leaves it empty.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// SQL Server's limit on row constructors in one `VALUES` list.
pub const MAX_ROWS_PER_INSERT: usize = 1000;

/// Column type used when a derived column is added to an existing table.
pub const DERIVED_COLUMN_TYPE: &str = "[nvarchar](32)";

/// A `[catalog.]schema.table` name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    catalog: Option<String>,
    schema: String,
    table: String,
}

impl TableName {
    /// Parses `table`, `schema.table` or `catalog.schema.table`.
    ///
    /// Parts may be bracket-quoted. An empty schema (`db..table`) means
    /// [`DEFAULT_SCHEMA`].
    pub fn parse(name: &str) -> Result<Self, LoadError> {
        let invalid = |reason: &str| LoadError::InvalidTableName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = name.trim().split('.').map(unbracket).collect();
        let (catalog, schema, table) = match parts.as_slice() {
            [table] => (None, "", *table),
            [schema, table] => (None, *schema, *table),
            [catalog, schema, table] => (Some(*catalog), *schema, *table),
            _ => return Err(invalid("expected at most three dot-separated parts")),
        };
        if table.is_empty() {
            return Err(invalid("table part is empty"));
        }
        if catalog.is_some_and(str::is_empty) {
            return Err(invalid("catalog part is empty"));
        }

        Ok(Self {
            catalog: catalog.map(str::to_string),
            schema: if schema.is_empty() {
                DEFAULT_SCHEMA.to_string()
            } else {
                schema.to_string()
            },
            table: table.to_string(),
        })
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fully bracket-quoted name.
    pub fn quoted(&self) -> String {
        let mut quoted = String::new();
        if let Some(catalog) = &self.catalog {
            quoted.push_str(&quote_ident(catalog));
            quoted.push('.');
        }
        quoted.push_str(&quote_ident(&self.schema));
        quoted.push('.');
        quoted.push_str(&quote_ident(&self.table));
        quoted
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.quoted())
    }
}

impl FromStr for TableName {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn unbracket(part: &str) -> &str {
    let part = part.trim();
    part.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(part)
}

/// Batch separator understood by `sqlcmd` and SSMS.
pub const BATCH_SEPARATOR: &str = "GO";

pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

pub fn quote_literal(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}

pub fn truncate_statement(table: &TableName) -> String {
    format!("TRUNCATE TABLE {table};")
}

/// Adds `column` to `table` unless it already exists.
pub fn ensure_column_statement(table: &TableName, column: &str, sql_type: &str) -> String {
    format!(
        "IF COL_LENGTH({}, {}) IS NULL\n    ALTER TABLE {table} ADD {} {sql_type} NULL;",
        quote_literal(&table.quoted()),
        quote_literal(column),
        quote_ident(column),
    )
}

/// Multi-row `INSERT` statements, at most [`MAX_ROWS_PER_INSERT`] rows each.
///
/// Values are taken from each record by column name.
pub fn insert_statements(
    table: &TableName,
    columns: &[&str],
    records: &[OutputRecord],
) -> Result<Vec<String>, LoadError> {
    let column_list = columns
        .iter()
        .map(|column| quote_ident(column))
        .collect::<Vec<_>>()
        .join(", ");

    let mut statements = Vec::with_capacity(records.len().div_ceil(MAX_ROWS_PER_INSERT));
    for (chunk_index, chunk) in records.chunks(MAX_ROWS_PER_INSERT).enumerate() {
        let mut rows = Vec::with_capacity(chunk.len());
        for (offset, record) in chunk.iter().enumerate() {
            let index = chunk_index * MAX_ROWS_PER_INSERT + offset;
            rows.push(format!("    ({})", value_list(index, columns, record)?));
        }
        statements.push(format!(
            "INSERT INTO {table} ({column_list})\nVALUES\n{};",
            rows.join(",\n")
        ));
    }
    Ok(statements)
}

fn value_list(index: usize, columns: &[&str], record: &OutputRecord) -> Result<String, LoadError> {
    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        let value = record.get(column).ok_or_else(|| LoadError::MissingValue {
            index,
            column: (*column).to_string(),
        })?;
        values.push(quote_literal(value));
    }
    Ok(values.join(", "))
}

/// Full replace-load script: ensure derived columns, truncate, insert.
///
/// The column DDL runs in its own batch, ended by [`BATCH_SEPARATOR`], so the
/// inserts compile against the altered table. The script is meant for
/// `sqlcmd` or SSMS, which split batches on that line.
pub fn load_script(
    table: &TableName,
    columns: &[&str],
    records: &[OutputRecord],
    ensure_columns: &[String],
) -> Result<String, LoadError> {
    let mut script = String::from("SET NOCOUNT ON;\n");
    for column in ensure_columns {
        script.push_str(&ensure_column_statement(table, column, DERIVED_COLUMN_TYPE));
        script.push('\n');
    }
    if !ensure_columns.is_empty() {
        script.push_str(BATCH_SEPARATOR);
        script.push('\n');
    }
    script.push_str("BEGIN TRANSACTION;\n");
    script.push_str(&truncate_statement(table));
    script.push('\n');
    for statement in insert_statements(table, columns, records)? {
        script.push_str(&statement);
        script.push('\n');
    }
    script.push_str("COMMIT TRANSACTION;\n");
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_qualified_names() {
        let table = TableName::parse("dm_aou.dbo.healthpro2").unwrap();
        assert_eq!(table.catalog(), Some("dm_aou"));
        assert_eq!(table.schema(), "dbo");
        assert_eq!(table.table(), "healthpro2");
        assert_eq!(table.quoted(), "[dm_aou].[dbo].[healthpro2]");
    }

    #[test]
    fn empty_schema_defaults_to_dbo() {
        let table = TableName::parse("dm_aou..healthpro").unwrap();
        assert_eq!(table.quoted(), "[dm_aou].[dbo].[healthpro]");
        assert_eq!(TableName::parse("healthpro").unwrap().quoted(), "[dbo].[healthpro]");
    }

    #[test]
    fn accepts_bracketed_parts() {
        let table = TableName::parse("[dm aou].[etl].[hp]").unwrap();
        assert_eq!(table.catalog(), Some("dm aou"));
        assert_eq!(table.quoted(), "[dm aou].[etl].[hp]");
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(TableName::parse("a.b.c.d").is_err());
        assert!(TableName::parse("dm_aou.dbo.").is_err());
        assert!(TableName::parse(".dbo.hp").is_err());
        assert!(TableName::parse("").is_err());
    }

    #[test]
    fn quoting_escapes_delimiters() {
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
        assert_eq!(quote_literal("O'Brien"), "N'O''Brien'");
        assert_eq!(quote_literal(""), "N''");
    }
}
