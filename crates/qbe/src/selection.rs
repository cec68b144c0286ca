//! Table selection and per-table column metadata.
//!
//! Selecting a table owes exactly one column fetch, represented by a
//! [`FetchTicket`]. Responses are applied through [`TableSelection::apply`],
//! which discards them when the ticket is stale: the table was deselected, or
//! deselected and selected again, while the fetch was in flight.
//!
//! The selection does not drive the compiler. Deselecting a table leaves grid
//! rows that reference it untouched, and they keep contributing to FROM.

use crate::error::QbeResult;
use crate::ident::TableRef;
use crate::schema::{ColumnMeta, ColumnSource};
use futures_util::future::join_all;

/// Column metadata state of a selected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnState {
    /// The fetch has been issued (or is about to be) and has not answered yet.
    Loading,
    Loaded(Vec<ColumnMeta>),
    /// The fetch failed; the message is kept for display.
    Failed(String),
}

/// The one fetch owed to a newly selected table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub table: TableRef,
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of [`TableSelection::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Selected(FetchTicket),
    Deselected,
}

#[derive(Debug, Clone)]
struct SelectedTable {
    table: TableRef,
    generation: u64,
    columns: ColumnState,
}

/// Selected tables in toggle order, each with its column state.
#[derive(Debug, Clone, Default)]
pub struct TableSelection {
    tables: Vec<SelectedTable>,
    next_generation: u64,
}

impl TableSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `table` if absent, otherwise deselect it.
    pub fn toggle(&mut self, table: impl Into<TableRef>) -> Toggle {
        let table = table.into();
        if let Some(pos) = self.position(&table) {
            self.tables.remove(pos);
            tracing::debug!(target: "qbe.selection", table = %table, "table deselected");
            return Toggle::Deselected;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.tables.push(SelectedTable {
            table: table.clone(),
            generation,
            columns: ColumnState::Loading,
        });
        tracing::debug!(target: "qbe.selection", table = %table, generation, "table selected");
        Toggle::Selected(FetchTicket { table, generation })
    }

    pub fn is_selected(&self, table: &TableRef) -> bool {
        self.position(table).is_some()
    }

    /// Whether a response for `ticket` would still be stored.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.entry(&ticket.table)
            .is_some_and(|t| t.generation == ticket.generation)
    }

    /// Store a fetch response. Returns `false` if the ticket is stale and the
    /// response was discarded.
    pub fn apply(&mut self, ticket: &FetchTicket, result: QbeResult<Vec<ColumnMeta>>) -> bool {
        let Some(entry) = self
            .tables
            .iter_mut()
            .find(|t| t.table == ticket.table && t.generation == ticket.generation)
        else {
            tracing::debug!(
                target: "qbe.selection",
                table = %ticket.table,
                generation = ticket.generation,
                "discarding stale column response"
            );
            return false;
        };

        entry.columns = match result {
            Ok(columns) => ColumnState::Loaded(columns),
            Err(err) => {
                tracing::warn!(
                    target: "qbe.selection",
                    table = %ticket.table,
                    error = %err,
                    "failed to load columns"
                );
                ColumnState::Failed(err.detail())
            }
        };
        true
    }

    /// Column state of a selected table.
    pub fn state(&self, table: &TableRef) -> Option<&ColumnState> {
        self.entry(table).map(|t| &t.columns)
    }

    /// Loaded columns of a selected table, if the fetch has succeeded.
    pub fn columns(&self, table: &TableRef) -> Option<&[ColumnMeta]> {
        match self.state(table)? {
            ColumnState::Loaded(columns) => Some(columns),
            _ => None,
        }
    }

    /// Selected tables in toggle order.
    pub fn tables(&self) -> impl Iterator<Item = &TableRef> {
        self.tables.iter().map(|t| &t.table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn position(&self, table: &TableRef) -> Option<usize> {
        self.tables.iter().position(|t| &t.table == table)
    }

    fn entry(&self, table: &TableRef) -> Option<&SelectedTable> {
        self.tables.iter().find(|t| &t.table == table)
    }
}

/// Issue one `fetch_columns` per ticket, concurrently, and collect the responses.
///
/// There is no batching and no coalescing: two tickets for the same table make
/// two calls.
pub async fn load_columns<S: ColumnSource>(
    source: &S,
    tickets: Vec<FetchTicket>,
) -> Vec<(FetchTicket, QbeResult<Vec<ColumnMeta>>)> {
    join_all(tickets.into_iter().map(|ticket| async move {
        tracing::debug!(target: "qbe.selection", table = %ticket.table, "fetching columns");
        let result = source.fetch_columns(&ticket.table).await;
        (ticket, result)
    }))
    .await
}
