//! Explicit QBE state: grid, table selection and the live SQL text.
//!
//! [`QbeSession`] is the single writer of its state. Every mutation runs one
//! full, synchronous recompute and republishes the new text on a
//! [`tokio::sync::watch`] channel; there is no batching and no diffing.
//!
//! ```
//! use qbe::{QbeSession, SortOrder};
//!
//! let mut session = QbeSession::new();
//! let preview = session.subscribe();
//!
//! session.toggle_table("users");
//! let id = session.add_column("users", "id");
//! session.set_sort(id, Some(SortOrder::Asc));
//!
//! assert_eq!(*preview.borrow(), "SELECT `users`.`id`\nFROM `users`\nORDER BY `users`.`id` ASC");
//! assert_eq!(session.revision(), 3);
//! ```

use crate::column::{ColumnEdit, ColumnId, QbeColumn, SortOrder};
use crate::compiler::SqlCompiler;
use crate::error::QbeResult;
use crate::execute::{QueryExecutor, QueryOutput, hand_off};
use crate::grid::QbeGrid;
use crate::ident::{QuoteStyle, TableRef};
use crate::schema::{ColumnMeta, ColumnSource};
use crate::selection::{FetchTicket, TableSelection, Toggle, load_columns};
use tokio::sync::watch;

/// Session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Identifier quoting used by the compiler.
    pub quote_style: QuoteStyle,
    /// Database passed along with every executed query.
    pub default_database: Option<String>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    pub fn default_database(mut self, database: impl Into<String>) -> Self {
        self.default_database = Some(database.into());
        self
    }
}

#[derive(Debug)]
pub struct QbeSession {
    config: SessionConfig,
    grid: QbeGrid,
    selection: TableSelection,
    pending: Vec<FetchTicket>,
    sql: String,
    revision: u64,
    publisher: watch::Sender<String>,
}

impl Default for QbeSession {
    fn default() -> Self {
        Self::with_config(SessionConfig::default())
    }
}

impl QbeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let (publisher, _) = watch::channel(String::new());
        Self {
            config,
            grid: QbeGrid::new(),
            selection: TableSelection::new(),
            pending: Vec::new(),
            sql: String::new(),
            revision: 0,
            publisher,
        }
    }

    // ==================== Table selection ====================

    /// Toggle a table in the selection. Returns `true` if it is now selected.
    ///
    /// Selecting queues one column fetch for the table (see
    /// [`QbeSession::load_columns`]). Deselecting drops the table's queued
    /// fetch but never removes grid rows.
    pub fn toggle_table(&mut self, table: impl Into<TableRef>) -> bool {
        let table = table.into();
        let selected = match self.selection.toggle(table.clone()) {
            Toggle::Selected(ticket) => {
                self.pending.push(ticket);
                true
            }
            Toggle::Deselected => {
                self.pending.retain(|t| t.table != table);
                if self.grid.references(&table) {
                    tracing::debug!(
                        target: "qbe.session",
                        table = %table,
                        "deselected table still referenced by grid rows"
                    );
                }
                false
            }
        };
        self.recompute();
        selected
    }

    /// Take the queued fetches whose tables are still selected.
    pub fn take_pending_fetches(&mut self) -> Vec<FetchTicket> {
        let selection = &self.selection;
        let (current, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|t| selection.is_current(t));
        for ticket in stale {
            tracing::debug!(
                target: "qbe.session",
                table = %ticket.table,
                "skipping fetch for deselected table"
            );
        }
        current
    }

    /// Store one fetch response. Returns `false` if it was stale and discarded.
    pub fn apply_columns(
        &mut self,
        ticket: &FetchTicket,
        result: QbeResult<Vec<ColumnMeta>>,
    ) -> bool {
        self.selection.apply(ticket, result)
    }

    /// Run every queued fetch against `source`, one call per table, and store
    /// the responses. Returns the number of responses stored.
    pub async fn load_columns<S: ColumnSource>(&mut self, source: &S) -> usize {
        let tickets = self.take_pending_fetches();
        let mut applied = 0;
        for (ticket, result) in load_columns(source, tickets).await {
            if self.selection.apply(&ticket, result) {
                applied += 1;
            }
        }
        applied
    }

    // ==================== Grid ====================

    /// Append a column to the grid with default settings.
    pub fn add_column(&mut self, table: impl Into<TableRef>, field: impl Into<String>) -> ColumnId {
        let id = self.grid.add_column(table, field);
        self.recompute();
        id
    }

    /// Remove a grid row. Returns the removed row, if it existed.
    pub fn remove_column(&mut self, id: ColumnId) -> Option<QbeColumn> {
        let removed = self.grid.remove_column(id);
        self.recompute();
        removed
    }

    pub fn clear_grid(&mut self) {
        self.grid.clear();
        self.recompute();
    }

    /// Apply one field edit. Returns `false` if `id` is not in the grid.
    pub fn edit_column(&mut self, id: ColumnId, edit: ColumnEdit) -> bool {
        let found = self.grid.edit(id, edit);
        self.recompute();
        found
    }

    pub fn set_alias(&mut self, id: ColumnId, alias: impl Into<String>) -> bool {
        self.edit_column(id, ColumnEdit::Alias(alias.into()))
    }

    pub fn set_show(&mut self, id: ColumnId, show: bool) -> bool {
        self.edit_column(id, ColumnEdit::Show(show))
    }

    pub fn set_sort(&mut self, id: ColumnId, sort: Option<SortOrder>) -> bool {
        self.edit_column(id, ColumnEdit::Sort(sort))
    }

    /// Sort-button semantics: choosing the active direction again clears it.
    pub fn toggle_sort(&mut self, id: ColumnId, order: SortOrder) -> bool {
        let found = self.grid.toggle_sort(id, order);
        self.recompute();
        found
    }

    pub fn set_criteria(&mut self, id: ColumnId, criteria: impl Into<String>) -> bool {
        self.edit_column(id, ColumnEdit::Criteria(criteria.into()))
    }

    pub fn set_or_criteria(&mut self, id: ColumnId, or_criteria: impl Into<String>) -> bool {
        self.edit_column(id, ColumnEdit::OrCriteria(or_criteria.into()))
    }

    pub fn set_quote_style(&mut self, style: QuoteStyle) {
        self.config.quote_style = style;
        self.recompute();
    }

    // ==================== Output ====================

    /// The current generated SQL; empty when the grid is empty.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of recomputes performed so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Receiver that observes every republished SQL text.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.publisher.subscribe()
    }

    pub fn grid(&self) -> &QbeGrid {
        &self.grid
    }

    pub fn selection(&self) -> &TableSelection {
        &self.selection
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Hand the current SQL to `executor` with the configured default database.
    pub async fn run<E: QueryExecutor>(&self, executor: &E) -> QbeResult<QueryOutput> {
        hand_off(executor, &self.sql, self.config.default_database.as_deref()).await
    }

    fn recompute(&mut self) {
        self.sql = SqlCompiler::new(self.config.quote_style).compile(&self.grid);
        self.revision += 1;
        tracing::trace!(
            target: "qbe.session",
            revision = self.revision,
            sql_len = self.sql.len(),
            "recomputed sql"
        );
        self.publisher.send_replace(self.sql.clone());
    }
}
