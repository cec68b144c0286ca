//! `tracing` instrumentation for the external collaborators.
//!
//! [`InstrumentedExecutor`] and [`InstrumentedSource`] wrap a collaborator and
//! emit events under the `qbe.sql` / `qbe.schema` targets. They never change
//! what is forwarded or returned.
//!
//! ```ignore
//! use qbe::monitor::InstrumentedExecutor;
//!
//! let executor = InstrumentedExecutor::new(PgExecutor::new(&client))
//!     .level(tracing::Level::INFO)
//!     .max_sql_length(500);
//! session.run(&executor).await?;
//! ```

use crate::error::QbeResult;
use crate::execute::{QueryExecutor, QueryOutput};
use crate::ident::TableRef;
use crate::schema::{ColumnMeta, ColumnSource};
use std::time::Instant;
use tracing::Level;

/// Truncate to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

/// Logs every handed-off query, its duration and its outcome.
#[derive(Debug, Clone)]
pub struct InstrumentedExecutor<E> {
    inner: E,
    /// Tracing event level for the query and completion events.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl<E> InstrumentedExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl<E: QueryExecutor> QueryExecutor for InstrumentedExecutor<E> {
    async fn execute_query(&self, sql: &str, database: Option<&str>) -> QbeResult<QueryOutput> {
        let shown = self.truncate_sql(sql);
        let database_field = database.unwrap_or("-");
        emit_at_level!(
            self.level,
            target: "qbe.sql",
            database = database_field,
            sql = %shown,
            "executing query"
        );

        let start = Instant::now();
        let result = self.inner.execute_query(sql, database).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(output) => emit_at_level!(
                self.level,
                target: "qbe.sql",
                database = database_field,
                elapsed_ms,
                row_count = output.row_count(),
                "query finished"
            ),
            Err(err) => tracing::warn!(
                target: "qbe.sql",
                database = database_field,
                elapsed_ms,
                sql = %shown,
                error = %err,
                "query failed"
            ),
        }
        result
    }
}

/// Logs every column-metadata fetch.
#[derive(Debug, Clone)]
pub struct InstrumentedSource<S> {
    inner: S,
    pub level: Level,
}

impl<S> InstrumentedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: ColumnSource> ColumnSource for InstrumentedSource<S> {
    async fn fetch_columns(&self, table: &TableRef) -> QbeResult<Vec<ColumnMeta>> {
        let start = Instant::now();
        let result = self.inner.fetch_columns(table).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(columns) => emit_at_level!(
                self.level,
                target: "qbe.schema",
                table = %table,
                elapsed_ms,
                column_count = columns.len(),
                "columns fetched"
            ),
            Err(err) => tracing::warn!(
                target: "qbe.schema",
                table = %table,
                elapsed_ms,
                error = %err,
                "column fetch failed"
            ),
        }
        result
    }
}
