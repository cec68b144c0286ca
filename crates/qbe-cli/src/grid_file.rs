//! Grid files: a TOML description of QBE rows replayed onto a session.
//!
//! ```toml
//! tables = ["users", "orders"]
//!
//! [[columns]]
//! table = "users"
//! field = "name"
//! sort = "DESC"
//!
//! [[columns]]
//! table = "users"
//! field = "age"
//! show = false
//! criteria = ">= 18"
//! or_criteria = "IS NULL"
//! ```

use qbe::{QbeSession, SortOrder};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridFile {
    /// Tables to select up front. Tables referenced by columns need not be listed.
    #[serde(default)]
    pub tables: Vec<String>,

    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnSpec {
    pub table: String,
    pub field: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default = "default_show")]
    pub show: bool,
    pub sort: Option<SortOrder>,
    #[serde(default)]
    pub criteria: String,
    #[serde(default)]
    pub or_criteria: String,
}

fn default_show() -> bool {
    true
}

impl GridFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read grid file {}: {e}", path.display()))?;
        Self::parse(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse grid file {}: {e:#}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let file: GridFile = toml::from_str(raw)?;
        for (i, col) in file.columns.iter().enumerate() {
            if col.table.trim().is_empty() || col.field.trim().is_empty() {
                anyhow::bail!("columns[{i}]: table and field must not be empty");
            }
        }
        Ok(file)
    }

    /// Replay the file onto `session` in order: table selections, then rows.
    pub fn apply(&self, session: &mut QbeSession) {
        for table in &self.tables {
            if !session.selection().is_selected(&table.as_str().into()) {
                session.toggle_table(table.as_str());
            }
        }

        for column in &self.columns {
            let id = session.add_column(column.table.as_str(), column.field.as_str());
            if !column.alias.is_empty() {
                session.set_alias(id, column.alias.as_str());
            }
            if !column.show {
                session.set_show(id, false);
            }
            if column.sort.is_some() {
                session.set_sort(id, column.sort);
            }
            if !column.criteria.is_empty() {
                session.set_criteria(id, column.criteria.as_str());
            }
            if !column.or_criteria.is_empty() {
                session.set_or_criteria(id, column.or_criteria.as_str());
            }
        }
    }

    /// Build a fresh session from this file.
    pub fn build_session(&self, config: qbe::SessionConfig) -> QbeSession {
        let mut session = QbeSession::with_config(config);
        self.apply(&mut session);
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbe::{QuoteStyle, SessionConfig};

    const GRID: &str = r#"
tables = ["users", "orders"]

[[columns]]
table = "users"
field = "name"
sort = "DESC"

[[columns]]
table = "users"
field = "age"
show = false
criteria = ">= 18"
or_criteria = "IS NULL"

[[columns]]
table = "orders"
field = "total"
alias = "amount"
"#;

    #[test]
    fn parses_rows_with_defaults() {
        let file = GridFile::parse(GRID).unwrap();
        assert_eq!(file.tables, ["users", "orders"]);
        assert_eq!(file.columns.len(), 3);
        assert!(file.columns[0].show);
        assert_eq!(file.columns[0].sort, Some(SortOrder::Desc));
        assert!(!file.columns[1].show);
        assert_eq!(file.columns[2].alias, "amount");
    }

    #[test]
    fn applies_onto_session() {
        let file = GridFile::parse(GRID).unwrap();
        let session = file.build_session(SessionConfig::new());

        assert_eq!(session.selection().len(), 2);
        assert_eq!(session.grid().len(), 3);
        assert_eq!(
            session.sql(),
            "SELECT `users`.`name`, `orders`.`total` AS `amount`\n\
             FROM `users`, `orders`\n\
             WHERE (`users`.`age` >= 18 OR `users`.`age` IS NULL)\n\
             ORDER BY `users`.`name` DESC"
        );
    }

    #[test]
    fn honors_quote_style() {
        let file = GridFile::parse("[[columns]]\ntable = \"users\"\nfield = \"id\"").unwrap();
        let session = file.build_session(SessionConfig::new().quote_style(QuoteStyle::DoubleQuote));
        assert_eq!(session.sql(), "SELECT \"users\".\"id\"\nFROM \"users\"");
    }

    #[test]
    fn empty_file_compiles_to_empty_sql() {
        let file = GridFile::parse("").unwrap();
        let session = file.build_session(SessionConfig::new());
        assert_eq!(session.sql(), "");
    }

    #[test]
    fn rejects_bad_rows() {
        assert!(GridFile::parse("[[columns]]\ntable = \"users\"\nfield = \"\"").is_err());
        assert!(GridFile::parse("[[columns]]\ntable = \"users\"\nfield = \"id\"\nsort = \"UP\"").is_err());
        assert!(GridFile::parse("[[columns]]\ntable = \"users\"\nfield = \"id\"\ncolour = 1").is_err());
    }
}
