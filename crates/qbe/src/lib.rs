//! # qbe
//!
//! Query-By-Example model and SQL compiler.
//!
//! A QBE grid is an ordered list of columns, each with display, sort and filter
//! settings. The compiler turns the grid into SELECT text on every change.
//!
//! ## Features
//!
//! - **Pure compiler**: [`compile`] / [`SqlCompiler`] are total functions of the grid rows
//! - **Explicit state**: [`QbeSession`] owns grid + selection and republishes SQL on every mutation
//! - **Mockable collaborators**: [`ColumnSource`] (one fetch per table) and [`QueryExecutor`]
//! - **Stale-response guard**: column responses for deselected tables are discarded
//! - **PostgreSQL adapters**: [`PgCatalog`] and [`PgExecutor`] over `tokio_postgres`
//!
//! ## Example
//!
//! ```
//! use qbe::{QbeSession, SortOrder};
//!
//! let mut session = QbeSession::new();
//! let id = session.add_column("users", "id");
//! let name = session.add_column("users", "name");
//! session.set_sort(id, Some(SortOrder::Asc));
//! session.set_criteria(name, "LIKE '%a%'");
//!
//! assert_eq!(
//!     session.sql(),
//!     "SELECT `users`.`id`, `users`.`name`\n\
//!      FROM `users`\n\
//!      WHERE `users`.`name` LIKE '%a%'\n\
//!      ORDER BY `users`.`id` ASC"
//! );
//! ```

pub mod column;
pub mod compiler;
pub mod condition;
pub mod error;
pub mod execute;
pub mod grid;
pub mod ident;
pub mod monitor;
pub mod pg_client;
pub mod schema;
pub mod selection;
pub mod session;

pub use column::{ColumnEdit, ColumnId, QbeColumn, SortOrder};
pub use compiler::{QueryParts, SqlCompiler, compile};
pub use condition::{Criterion, build_condition, row_predicate};
pub use error::{QbeError, QbeResult};
pub use execute::{QueryExecutor, QueryOutput, hand_off};
pub use grid::QbeGrid;
pub use ident::{QuoteStyle, TableRef, quote_ident};
pub use monitor::{InstrumentedExecutor, InstrumentedSource};
pub use pg_client::{PgCatalog, PgExecutor, SimpleQueryClient};
pub use schema::{ColumnMeta, ColumnSource};
pub use selection::{ColumnState, FetchTicket, TableSelection, Toggle, load_columns};
pub use session::{QbeSession, SessionConfig};
