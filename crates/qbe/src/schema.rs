//! Column metadata and the collaborator that supplies it.

use crate::error::QbeResult;
use crate::ident::TableRef;
use serde::{Deserialize, Serialize};

/// Metadata for one column of a table, as listed in the column picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub field: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    /// Key marker: `PRI`, `UNI`, `MUL` or empty.
    pub key: String,
    pub default: Option<String>,
    /// Extra attributes such as `auto_increment`; empty when none.
    pub extra: String,
}

impl ColumnMeta {
    /// A nullable, key-less column of `data_type`.
    pub fn new(field: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            data_type: data_type.into(),
            nullable: true,
            key: String::new(),
            default: None,
            extra: String::new(),
        }
    }
}

/// Supplies column metadata, one call per table.
///
/// Implementations must not batch or coalesce: the selection model issues
/// exactly one `fetch_columns` per newly selected table.
pub trait ColumnSource: Send + Sync {
    /// Fetch the ordered column list of `table`.
    fn fetch_columns(
        &self,
        table: &TableRef,
    ) -> impl std::future::Future<Output = QbeResult<Vec<ColumnMeta>>> + Send;
}

impl<S: ColumnSource> ColumnSource for &S {
    fn fetch_columns(
        &self,
        table: &TableRef,
    ) -> impl std::future::Future<Output = QbeResult<Vec<ColumnMeta>>> + Send {
        (**self).fetch_columns(table)
    }
}

impl<S: ColumnSource> ColumnSource for std::sync::Arc<S> {
    fn fetch_columns(
        &self,
        table: &TableRef,
    ) -> impl std::future::Future<Output = QbeResult<Vec<ColumnMeta>>> + Send {
        (**self).fetch_columns(table)
    }
}
