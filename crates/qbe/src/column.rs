//! Grid row model.

use crate::ident::TableRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, never-reused identifier of a grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnId(Uuid);

impl ColumnId {
    /// Generate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ColumnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Sort direction of a grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortOrder {
    pub const fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One row of the QBE grid.
///
/// Rows are created by [`QbeGrid::add_column`](crate::QbeGrid::add_column) with
/// defaults (`show = true`, everything else empty) and edited in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QbeColumn {
    pub id: ColumnId,
    /// Table reference, optionally qualified as `"database.table"`.
    pub table: TableRef,
    pub field: String,
    /// Projection alias; empty means no alias.
    pub alias: String,
    /// Whether the column appears in the SELECT list.
    pub show: bool,
    pub sort: Option<SortOrder>,
    /// Raw filter text; empty means no filter.
    pub criteria: String,
    /// Secondary raw filter text, OR-combined with `criteria`.
    pub or_criteria: String,
}

impl QbeColumn {
    /// Create a row with default settings and a fresh id.
    pub fn new(table: impl Into<TableRef>, field: impl Into<String>) -> Self {
        Self {
            id: ColumnId::new(),
            table: table.into(),
            field: field.into(),
            alias: String::new(),
            show: true,
            sort: None,
            criteria: String::new(),
            or_criteria: String::new(),
        }
    }

    /// Apply a single field edit.
    pub fn apply(&mut self, edit: ColumnEdit) {
        match edit {
            ColumnEdit::Alias(alias) => self.alias = alias,
            ColumnEdit::Show(show) => self.show = show,
            ColumnEdit::Sort(sort) => self.sort = sort,
            ColumnEdit::Criteria(criteria) => self.criteria = criteria,
            ColumnEdit::OrCriteria(or_criteria) => self.or_criteria = or_criteria,
        }
    }
}

/// A direct edit of one editable grid field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEdit {
    Alias(String),
    Show(bool),
    Sort(Option<SortOrder>),
    Criteria(String),
    OrCriteria(String),
}
