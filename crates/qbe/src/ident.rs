//! SQL identifier quoting.
//!
//! Every identifier segment (database, table, column, alias) is wrapped in its
//! own pair of quote characters. A table reference such as `"sales.orders"` is
//! split on `.` and each segment quoted independently:
//!
//! ```
//! use qbe::{QuoteStyle, TableRef};
//!
//! let t = TableRef::parse("sales.orders");
//! assert_eq!(t.to_sql(QuoteStyle::Backtick), "`sales`.`orders`");
//! assert_eq!(t.column_sql("id", QuoteStyle::DoubleQuote), r#""sales"."orders"."id""#);
//! ```
//!
//! Quoting never fails: empty segments become an empty quoted identifier and an
//! embedded quote character is doubled, so malformed names flow through to the
//! database, which reports them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the database qualifier and the table name.
pub const QUALIFIER_SEPARATOR: char = '.';

/// The identifier-quote character pair used when rendering SQL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    /// MySQL-style `` `name` ``.
    #[default]
    Backtick,
    /// ANSI / PostgreSQL-style `"name"`.
    DoubleQuote,
}

impl QuoteStyle {
    /// The quote character for this style.
    pub const fn quote_char(self) -> char {
        match self {
            QuoteStyle::Backtick => '`',
            QuoteStyle::DoubleQuote => '"',
        }
    }

    /// Parse a style name as used in config files and CLI flags.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "backtick" | "mysql" => Some(QuoteStyle::Backtick),
            "double" | "double_quote" | "ansi" | "postgres" => Some(QuoteStyle::DoubleQuote),
            _ => None,
        }
    }
}

/// Quote a single identifier segment.
pub fn quote_ident(name: &str, style: QuoteStyle) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_ident(&mut out, name, style);
    out
}

pub(crate) fn write_ident(out: &mut String, name: &str, style: QuoteStyle) {
    let q = style.quote_char();
    out.push(q);
    for ch in name.chars() {
        if ch == q {
            out.push(q);
        }
        out.push(ch);
    }
    out.push(q);
}

/// A table reference as stored on a grid row, optionally qualified as `"database.table"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    raw: String,
}

impl TableRef {
    /// Wrap a raw table reference. Never fails.
    pub fn parse(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The reference exactly as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Database qualifier, if the reference has one.
    pub fn database(&self) -> Option<&str> {
        self.raw
            .split_once(QUALIFIER_SEPARATOR)
            .map(|(database, _)| database)
    }

    /// Table name without its database qualifier.
    pub fn table(&self) -> &str {
        match self.raw.split_once(QUALIFIER_SEPARATOR) {
            Some((_, table)) => table,
            None => &self.raw,
        }
    }

    /// Render the reference with every segment quoted.
    pub fn to_sql(&self, style: QuoteStyle) -> String {
        let mut out = String::with_capacity(self.raw.len() + 4);
        self.write_sql(&mut out, style);
        out
    }

    /// Render `<table ref>.<quoted column>`.
    pub fn column_sql(&self, field: &str, style: QuoteStyle) -> String {
        let mut out = String::with_capacity(self.raw.len() + field.len() + 6);
        self.write_sql(&mut out, style);
        out.push('.');
        write_ident(&mut out, field, style);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String, style: QuoteStyle) {
        for (i, segment) in self.raw.split(QUALIFIER_SEPARATOR).enumerate() {
            if i > 0 {
                out.push('.');
            }
            write_ident(out, segment, style);
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for TableRef {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for TableRef {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}
