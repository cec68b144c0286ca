//! Execution handoff.
//!
//! The generated text is forwarded verbatim to a [`QueryExecutor`]. Nothing is
//! validated or rewritten on the way; syntax errors come back from the executor.

use crate::error::{QbeError, QbeResult};
use serde::{Deserialize, Serialize};

/// Tabular result of an executed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Rows of scalar values, each aligned with `columns`.
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryOutput {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Runs SQL text against a database.
pub trait QueryExecutor: Send + Sync {
    /// Execute `sql`, optionally against `database` instead of the connection default.
    fn execute_query(
        &self,
        sql: &str,
        database: Option<&str>,
    ) -> impl std::future::Future<Output = QbeResult<QueryOutput>> + Send;
}

impl<E: QueryExecutor> QueryExecutor for &E {
    fn execute_query(
        &self,
        sql: &str,
        database: Option<&str>,
    ) -> impl std::future::Future<Output = QbeResult<QueryOutput>> + Send {
        (**self).execute_query(sql, database)
    }
}

impl<E: QueryExecutor> QueryExecutor for std::sync::Arc<E> {
    fn execute_query(
        &self,
        sql: &str,
        database: Option<&str>,
    ) -> impl std::future::Future<Output = QbeResult<QueryOutput>> + Send {
        (**self).execute_query(sql, database)
    }
}

/// Hand `sql` to `executor` unchanged.
///
/// Empty text is refused with [`QbeError::EmptyQuery`] without calling the
/// executor; an empty grid has nothing to run.
pub async fn hand_off<E: QueryExecutor>(
    executor: &E,
    sql: &str,
    database: Option<&str>,
) -> QbeResult<QueryOutput> {
    if sql.is_empty() {
        return Err(QbeError::EmptyQuery);
    }
    executor.execute_query(sql, database).await
}
