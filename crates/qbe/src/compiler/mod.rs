//! Grid-to-SQL compiler.
//!
//! Compilation is a pure function of the grid rows. The table selection is
//! never consulted: FROM lists exactly the tables the rows reference, in
//! first-seen order.
//!
//! Pipeline, rerun from scratch on every call:
//!
//! 1. projection: shown rows in grid order, `AS <alias>` when the alias is set,
//!    `*` when nothing is shown
//! 2. FROM: distinct table refs of all rows (shown or not), first-seen order
//! 3. WHERE: per-row predicates (see [`row_predicate`]) joined with `AND`
//! 4. ORDER BY: rows with a sort, in grid order
//! 5. assembly: one clause per line, empty clauses omitted; an empty grid
//!    compiles to the empty string
//!
//! # Example
//! ```
//! use qbe::{QbeGrid, SortOrder, ColumnEdit, compile};
//!
//! let mut grid = QbeGrid::new();
//! let id = grid.add_column("users", "id");
//! grid.edit(id, ColumnEdit::Sort(Some(SortOrder::Asc)));
//!
//! assert_eq!(
//!     compile(&grid),
//!     "SELECT `users`.`id`\nFROM `users`\nORDER BY `users`.`id` ASC"
//! );
//! ```

use crate::column::QbeColumn;
use crate::condition::row_predicate;
use crate::grid::QbeGrid;
use crate::ident::{QuoteStyle, TableRef, write_ident};
use std::fmt;

/// Compile `grid` with the default (backtick) quoting.
pub fn compile(grid: &QbeGrid) -> String {
    SqlCompiler::default().compile(grid)
}

/// Compiles grid rows into SELECT text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlCompiler {
    quote: QuoteStyle,
}

impl SqlCompiler {
    pub fn new(quote: QuoteStyle) -> Self {
        Self { quote }
    }

    pub fn quote_style(&self) -> QuoteStyle {
        self.quote
    }

    /// Compile the grid to SQL text. Returns `""` for an empty grid.
    pub fn compile(&self, grid: &QbeGrid) -> String {
        self.compile_rows(grid.rows())
    }

    /// Compile a slice of rows in order.
    pub fn compile_rows(&self, rows: &[QbeColumn]) -> String {
        match self.parts(rows) {
            Some(parts) => parts.to_sql(),
            None => String::new(),
        }
    }

    /// Compute the individual clauses. Returns `None` for zero rows.
    pub fn parts(&self, rows: &[QbeColumn]) -> Option<QueryParts> {
        if rows.is_empty() {
            return None;
        }

        let mut parts = QueryParts::default();
        let mut seen_tables: Vec<&TableRef> = Vec::new();

        for col in rows {
            let col_ref = col.table.column_sql(&col.field, self.quote);

            if col.show {
                let mut item = col_ref.clone();
                if !col.alias.is_empty() {
                    item.push_str(" AS ");
                    write_ident(&mut item, &col.alias, self.quote);
                }
                parts.projection.push(item);
            }

            if !seen_tables.contains(&&col.table) {
                seen_tables.push(&col.table);
                parts.from.push(col.table.to_sql(self.quote));
            }

            if let Some(predicate) = row_predicate(&col_ref, &col.criteria, &col.or_criteria) {
                parts.predicates.push(predicate);
            }

            if let Some(sort) = col.sort {
                parts.ordering.push(format!("{col_ref} {sort}"));
            }
        }

        Some(parts)
    }
}

/// The clauses of a compiled grid, before assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParts {
    /// SELECT items; empty means `*`.
    pub projection: Vec<String>,
    /// Quoted table refs for FROM.
    pub from: Vec<String>,
    /// Per-row predicates, AND-joined.
    pub predicates: Vec<String>,
    /// ORDER BY items.
    pub ordering: Vec<String>,
}

impl QueryParts {
    /// Assemble the clauses, one per line.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.projection.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.projection.join(", "));
        }

        if !self.from.is_empty() {
            sql.push_str("\nFROM ");
            sql.push_str(&self.from.join(", "));
        }

        if !self.predicates.is_empty() {
            sql.push_str("\nWHERE ");
            sql.push_str(&self.predicates.join(" AND "));
        }

        if !self.ordering.is_empty() {
            sql.push_str("\nORDER BY ");
            sql.push_str(&self.ordering.join(", "));
        }

        sql
    }
}

impl fmt::Display for QueryParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
