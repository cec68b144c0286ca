//! PostgreSQL collaborators over `tokio_postgres`.
//!
//! - [`PgCatalog`]: column metadata from `information_schema`, one query per table.
//! - [`PgExecutor`]: runs generated text through the simple-query protocol and
//!   returns every value as text. A per-query database is applied through
//!   `search_path` and reset afterwards.
//!
//! Generated SQL for PostgreSQL should use [`QuoteStyle::DoubleQuote`].

use crate::error::{QbeError, QbeResult};
use crate::execute::{QueryExecutor, QueryOutput};
use crate::ident::{QuoteStyle, TableRef, quote_ident};
use crate::schema::{ColumnMeta, ColumnSource};
use tokio_postgres::types::FromSql;
use tokio_postgres::{Client, Row, SimpleQueryMessage};

const COLUMNS_SQL: &str = r#"
SELECT
  c.column_name::text AS field,
  c.data_type::text AS data_type,
  (c.is_nullable = 'YES') AS nullable,
  COALESCE(k.key, '') AS key,
  c.column_default::text AS default_expr,
  CASE
    WHEN c.is_identity = 'YES' THEN 'identity'
    WHEN c.column_default LIKE 'nextval(%' THEN 'auto_increment'
    ELSE ''
  END AS extra
FROM information_schema.columns c
LEFT JOIN LATERAL (
  SELECT
    CASE MIN(CASE tc.constraint_type
               WHEN 'PRIMARY KEY' THEN 1
               WHEN 'UNIQUE' THEN 2
               ELSE 3
             END)
      WHEN 1 THEN 'PRI'
      WHEN 2 THEN 'UNI'
      WHEN 3 THEN 'MUL'
    END AS key
  FROM information_schema.key_column_usage kcu
  JOIN information_schema.table_constraints tc
    ON tc.constraint_schema = kcu.constraint_schema
   AND tc.constraint_name = kcu.constraint_name
  WHERE kcu.table_schema = c.table_schema
    AND kcu.table_name = c.table_name
    AND kcu.column_name = c.column_name
) k ON true
WHERE c.table_schema::text = $1::text
  AND c.table_name::text = $2::text
ORDER BY c.ordinal_position
"#;

fn get_column<'a, T: FromSql<'a>>(row: &'a Row, column: &str) -> QbeResult<T> {
    row.try_get(column)
        .map_err(|e| QbeError::decode(column, e.to_string()))
}

/// Column metadata from `information_schema.columns`.
///
/// A database qualifier on the table ref (`"sales.orders"`) is used as the
/// schema; unqualified refs use `default_schema`.
#[derive(Clone, Copy)]
pub struct PgCatalog<'a> {
    client: &'a Client,
    default_schema: &'a str,
}

impl<'a> PgCatalog<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            default_schema: "public",
        }
    }

    pub fn default_schema(mut self, schema: &'a str) -> Self {
        self.default_schema = schema;
        self
    }

    fn resolve<'t>(&self, table: &'t TableRef) -> (&'t str, &'t str)
    where
        'a: 't,
    {
        (table.database().unwrap_or(self.default_schema), table.table())
    }
}

impl std::fmt::Debug for PgCatalog<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCatalog")
            .field("default_schema", &self.default_schema)
            .finish_non_exhaustive()
    }
}

impl ColumnSource for PgCatalog<'_> {
    async fn fetch_columns(&self, table: &TableRef) -> QbeResult<Vec<ColumnMeta>> {
        let (schema, name) = self.resolve(table);
        let rows = self
            .client
            .query(COLUMNS_SQL, &[&schema, &name])
            .await
            .map_err(|e| QbeError::fetch(table.as_str(), QbeError::Query(e).detail()))?;

        if rows.is_empty() {
            return Err(QbeError::fetch(
                table.as_str(),
                format!("relation {schema}.{name} not found or has no columns"),
            ));
        }

        rows.iter()
            .map(|row| {
                Ok(ColumnMeta {
                    field: get_column(row, "field")?,
                    data_type: get_column(row, "data_type")?,
                    nullable: get_column(row, "nullable")?,
                    key: get_column(row, "key")?,
                    default: get_column(row, "default_expr")?,
                    extra: get_column(row, "extra")?,
                })
            })
            .collect()
    }
}

/// The simple-query calls [`PgExecutor`] issues.
pub trait SimpleQueryClient: Send + Sync {
    /// Run statements that return no rows.
    fn batch_execute(&self, sql: &str) -> impl std::future::Future<Output = QbeResult<()>> + Send;

    /// Run `sql` and return the raw simple-query messages.
    fn simple_query(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = QbeResult<Vec<SimpleQueryMessage>>> + Send;
}

impl SimpleQueryClient for Client {
    async fn batch_execute(&self, sql: &str) -> QbeResult<()> {
        Ok(Client::batch_execute(self, sql).await?)
    }

    async fn simple_query(&self, sql: &str) -> QbeResult<Vec<SimpleQueryMessage>> {
        Ok(Client::simple_query(self, sql).await?)
    }
}

/// Executes generated SQL verbatim.
///
/// When a database is given, `search_path` is switched to it for this query
/// only and reset afterwards, whether or not the query succeeded.
pub struct PgExecutor<'a, C = Client> {
    client: &'a C,
}

impl<C> Clone for PgExecutor<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for PgExecutor<'_, C> {}

impl<'a, C: SimpleQueryClient> PgExecutor<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }
}

impl<C> std::fmt::Debug for PgExecutor<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgExecutor").finish_non_exhaustive()
    }
}

fn search_path_statement(database: &str) -> String {
    format!(
        "SET search_path TO {}",
        quote_ident(database, QuoteStyle::DoubleQuote)
    )
}

const RESET_SEARCH_PATH: &str = "RESET search_path";

/// Re-tag a driver error with `wrap`; errors already classified pass through.
fn driver_error(err: QbeError, wrap: impl FnOnce(String) -> QbeError) -> QbeError {
    match err {
        QbeError::Query(_) => wrap(err.detail()),
        other => other,
    }
}

impl<C: SimpleQueryClient> PgExecutor<'_, C> {
    async fn run_simple(&self, sql: &str) -> QbeResult<QueryOutput> {
        let messages = self
            .client
            .simple_query(sql)
            .await
            .map_err(|e| driver_error(e, QbeError::Execution))?;
        Ok(collect_output(messages))
    }
}

impl<C: SimpleQueryClient> QueryExecutor for PgExecutor<'_, C> {
    async fn execute_query(&self, sql: &str, database: Option<&str>) -> QbeResult<QueryOutput> {
        let Some(db) = database.filter(|db| !db.is_empty()) else {
            return self.run_simple(sql).await;
        };

        self.client
            .batch_execute(&search_path_statement(db))
            .await
            .map_err(|e| driver_error(e, QbeError::Connection))?;

        let result = self.run_simple(sql).await;

        if let Err(err) = self.client.batch_execute(RESET_SEARCH_PATH).await {
            tracing::warn!(
                target: "qbe.sql",
                database = db,
                error = %err,
                "failed to reset search_path"
            );
            if result.is_ok() {
                return Err(driver_error(err, QbeError::Connection));
            }
        }
        result
    }
}

/// Collect the first result set of a simple-query response.
fn collect_output(messages: Vec<SimpleQueryMessage>) -> QueryOutput {
    let mut output = QueryOutput::default();
    let mut described = false;

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) if !described => {
                output.columns = columns.iter().map(|c| c.name().to_string()).collect();
                described = true;
            }
            SimpleQueryMessage::Row(row) => {
                if !described {
                    output.columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                    described = true;
                }
                let values = (0..row.len())
                    .map(|i| match row.get(i) {
                        Some(text) => serde_json::Value::String(text.to_string()),
                        None => serde_json::Value::Null,
                    })
                    .collect();
                output.rows.push(values);
            }
            SimpleQueryMessage::CommandComplete(_) if described => break,
            _ => {}
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        statements: Mutex<Vec<String>>,
        fail_query: bool,
    }

    impl SimpleQueryClient for RecordingClient {
        async fn batch_execute(&self, sql: &str) -> QbeResult<()> {
            self.statements.lock().unwrap().push(sql.to_string());
            Ok(())
        }

        async fn simple_query(&self, sql: &str) -> QbeResult<Vec<SimpleQueryMessage>> {
            self.statements.lock().unwrap().push(sql.to_string());
            if self.fail_query {
                return Err(QbeError::execution("syntax error at or near \"FROM\""));
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn search_path_is_scoped_to_one_query() {
        let client = RecordingClient::default();
        let executor = PgExecutor::new(&client);

        executor.execute_query("SELECT 1", Some("sales")).await.unwrap();
        executor.execute_query("SELECT 2", None).await.unwrap();

        assert_eq!(
            *client.statements.lock().unwrap(),
            [
                "SET search_path TO \"sales\"",
                "SELECT 1",
                "RESET search_path",
                "SELECT 2",
            ]
        );
    }

    #[tokio::test]
    async fn search_path_is_reset_after_failed_query() {
        let client = RecordingClient {
            fail_query: true,
            ..Default::default()
        };
        let executor = PgExecutor::new(&client);

        let err = executor
            .execute_query("SELEC 1 FROM", Some("sales"))
            .await
            .unwrap_err();
        assert!(matches!(err, QbeError::Execution(msg) if msg == "syntax error at or near \"FROM\""));
        assert_eq!(
            client.statements.lock().unwrap().last().map(String::as_str),
            Some("RESET search_path")
        );
    }

    #[tokio::test]
    async fn empty_database_does_not_touch_search_path() {
        let client = RecordingClient::default();
        PgExecutor::new(&client)
            .execute_query("SELECT 1", Some(""))
            .await
            .unwrap();
        assert_eq!(*client.statements.lock().unwrap(), ["SELECT 1"]);
    }

    #[test]
    fn search_path_statement_quotes_schema() {
        assert_eq!(
            search_path_statement("my\"schema"),
            "SET search_path TO \"my\"\"schema\""
        );
    }
}
