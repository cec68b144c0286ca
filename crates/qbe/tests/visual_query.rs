//! End-to-end flow: select tables, load columns, build the grid, run.

use qbe::{
    ColumnMeta, ColumnSource, InstrumentedExecutor, InstrumentedSource, QbeError, QbeResult,
    QbeSession, QueryExecutor, QueryOutput, QuoteStyle, SessionConfig, SortOrder, TableRef,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

struct FakeCatalog {
    tables: HashMap<&'static str, Vec<&'static str>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert("users", vec!["id", "name", "age"]);
        tables.insert("orders", vec!["id", "user_id", "total"]);
        Self {
            tables,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ColumnSource for FakeCatalog {
    async fn fetch_columns(&self, table: &TableRef) -> QbeResult<Vec<ColumnMeta>> {
        self.calls.lock().unwrap().push(table.to_string());
        // Answer out of order to exercise concurrent fan-out.
        if table.table() == "users" {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let fields = self
            .tables
            .get(table.table())
            .ok_or_else(|| QbeError::fetch(table.as_str(), "relation does not exist"))?;
        Ok(fields.iter().map(|f| ColumnMeta::new(*f, "text")).collect())
    }
}

/// Rejects anything that is not a SELECT, like a database would on bad syntax.
struct FakeDatabase;

impl QueryExecutor for FakeDatabase {
    async fn execute_query(&self, sql: &str, _database: Option<&str>) -> QbeResult<QueryOutput> {
        if !sql.starts_with("SELECT ") {
            return Err(QbeError::execution(format!("syntax error near {sql:?}")));
        }
        if sql.contains("((") {
            return Err(QbeError::execution("syntax error at or near \"(\""));
        }
        Ok(QueryOutput {
            columns: vec!["name".into()],
            rows: vec![vec![serde_json::json!("alice")]],
        })
    }
}

#[tokio::test]
async fn build_and_run_query_from_loaded_columns() {
    let catalog = InstrumentedSource::new(FakeCatalog::new());
    let mut session = QbeSession::new();

    session.toggle_table("users");
    session.toggle_table("orders");
    assert_eq!(session.load_columns(&catalog).await, 2);
    assert_eq!(catalog.inner().calls.lock().unwrap().len(), 2);

    // Double-click columns from the loaded lists.
    let users = TableRef::parse("users");
    let fields: Vec<String> = session
        .selection()
        .columns(&users)
        .unwrap()
        .iter()
        .map(|c| c.field.clone())
        .collect();
    assert_eq!(fields, ["id", "name", "age"]);

    let name = session.add_column("users", &*fields[1]);
    let age = session.add_column("users", &*fields[2]);
    let total = session.add_column("orders", "total");

    session.set_show(age, false);
    session.set_criteria(age, ">= 18");
    session.set_or_criteria(age, "IS NULL");
    session.set_alias(total, "amount");
    session.toggle_sort(name, SortOrder::Desc);

    assert_eq!(
        session.sql(),
        "SELECT `users`.`name`, `orders`.`total` AS `amount`\n\
         FROM `users`, `orders`\n\
         WHERE (`users`.`age` >= 18 OR `users`.`age` IS NULL)\n\
         ORDER BY `users`.`name` DESC"
    );

    let executor = InstrumentedExecutor::new(FakeDatabase);
    let out = session.run(&executor).await.unwrap();
    assert_eq!(out.columns, ["name"]);
    assert_eq!(out.rows, [[serde_json::json!("alice")]]);
}

#[tokio::test]
async fn unknown_table_is_reported_per_table() {
    let catalog = FakeCatalog::new();
    let mut session = QbeSession::new();
    session.toggle_table("users");
    session.toggle_table("missing");

    assert_eq!(session.load_columns(&catalog).await, 2);
    assert!(session.selection().columns(&TableRef::parse("users")).is_some());
    assert_eq!(
        session.selection().state(&TableRef::parse("missing")),
        Some(&qbe::ColumnState::Failed("relation does not exist".into()))
    );
}

#[tokio::test]
async fn malformed_criteria_surfaces_as_execution_error() {
    let mut session = QbeSession::new();
    let id = session.add_column("users", "name");
    session.set_criteria(id, "IN ((");

    // Not recognized as an operator, so an implied equality is assembled as-is.
    assert!(session.sql().ends_with("WHERE `users`.`name` = IN (("));

    let err = session.run(&FakeDatabase).await.unwrap_err();
    assert!(matches!(err, QbeError::Execution(_)));
}

#[tokio::test]
async fn postgres_style_session() {
    let config = SessionConfig::new()
        .quote_style(QuoteStyle::DoubleQuote)
        .default_database("public");
    let mut session = QbeSession::with_config(config);
    let id = session.add_column("public.users", "id");
    session.set_criteria(id, "42");

    assert_eq!(
        session.sql(),
        "SELECT \"public\".\"users\".\"id\"\nFROM \"public\".\"users\"\nWHERE \"public\".\"users\".\"id\" = 42"
    );
}
