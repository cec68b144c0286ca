//! The QBE grid: an insertion-ordered list of [`QbeColumn`] rows.
//!
//! Row order drives SELECT/WHERE/ORDER BY order and is never changed except by
//! removing rows. Duplicate `(table, field)` pairs are allowed.

use crate::column::{ColumnEdit, ColumnId, QbeColumn, SortOrder};
use crate::ident::TableRef;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QbeGrid {
    rows: Vec<QbeColumn>,
}

impl QbeGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new row with default settings and return its id.
    pub fn add_column(&mut self, table: impl Into<TableRef>, field: impl Into<String>) -> ColumnId {
        let col = QbeColumn::new(table, field);
        let id = col.id;
        self.rows.push(col);
        id
    }

    /// Remove the row with `id`. Returns the removed row, if any.
    pub fn remove_column(&mut self, id: ColumnId) -> Option<QbeColumn> {
        let pos = self.rows.iter().position(|c| c.id == id)?;
        Some(self.rows.remove(pos))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Apply `edit` to the row with `id`. Returns `false` if no such row exists.
    pub fn edit(&mut self, id: ColumnId, edit: ColumnEdit) -> bool {
        match self.get_mut(id) {
            Some(col) => {
                col.apply(edit);
                true
            }
            None => false,
        }
    }

    /// Sort-button semantics: picking the active direction clears it,
    /// picking the other direction replaces it.
    pub fn toggle_sort(&mut self, id: ColumnId, order: SortOrder) -> bool {
        match self.get_mut(id) {
            Some(col) => {
                col.sort = if col.sort == Some(order) { None } else { Some(order) };
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ColumnId) -> Option<&QbeColumn> {
        self.rows.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: ColumnId) -> Option<&mut QbeColumn> {
        self.rows.iter_mut().find(|c| c.id == id)
    }

    pub fn rows(&self) -> &[QbeColumn] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QbeColumn> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any row references `table`.
    pub fn references(&self, table: &TableRef) -> bool {
        self.rows.iter().any(|c| &c.table == table)
    }
}

impl<'a> IntoIterator for &'a QbeGrid {
    type Item = &'a QbeColumn;
    type IntoIter = std::slice::Iter<'a, QbeColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl FromIterator<QbeColumn> for QbeGrid {
    fn from_iter<I: IntoIterator<Item = QbeColumn>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(grid: &QbeGrid) -> Vec<&str> {
        grid.iter().map(|c| c.field.as_str()).collect()
    }

    #[test]
    fn add_appends_in_order() {
        let mut grid = QbeGrid::new();
        grid.add_column("users", "id");
        grid.add_column("users", "name");
        grid.add_column("orders", "total");
        assert_eq!(fields(&grid), ["id", "name", "total"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut grid = QbeGrid::new();
        let a = grid.add_column("users", "id");
        let b = grid.add_column("users", "id");
        assert_ne!(a, b);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn remove_keeps_relative_order() {
        let mut grid = QbeGrid::new();
        grid.add_column("t", "a");
        let b = grid.add_column("t", "b");
        grid.add_column("t", "c");

        let removed = grid.remove_column(b).unwrap();
        assert_eq!(removed.field, "b");
        assert_eq!(fields(&grid), ["a", "c"]);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut grid = QbeGrid::new();
        grid.add_column("t", "a");
        assert!(grid.remove_column(ColumnId::new()).is_none());
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn clear_empties() {
        let mut grid = QbeGrid::new();
        grid.add_column("t", "a");
        grid.add_column("t", "b");
        grid.clear();
        assert!(grid.is_empty());
    }

    #[test]
    fn edit_targets_one_row() {
        let mut grid = QbeGrid::new();
        let a = grid.add_column("t", "a");
        let b = grid.add_column("t", "b");

        assert!(grid.edit(b, ColumnEdit::Criteria("> 1".into())));
        assert_eq!(grid.get(a).unwrap().criteria, "");
        assert_eq!(grid.get(b).unwrap().criteria, "> 1");
        assert!(!grid.edit(ColumnId::new(), ColumnEdit::Show(false)));
    }

    #[test]
    fn toggle_sort_cycles() {
        let mut grid = QbeGrid::new();
        let id = grid.add_column("t", "a");

        grid.toggle_sort(id, SortOrder::Asc);
        assert_eq!(grid.get(id).unwrap().sort, Some(SortOrder::Asc));
        grid.toggle_sort(id, SortOrder::Desc);
        assert_eq!(grid.get(id).unwrap().sort, Some(SortOrder::Desc));
        grid.toggle_sort(id, SortOrder::Desc);
        assert_eq!(grid.get(id).unwrap().sort, None);
    }

    #[test]
    fn references_table() {
        let mut grid = QbeGrid::new();
        grid.add_column("shop.orders", "id");
        assert!(grid.references(&TableRef::parse("shop.orders")));
        assert!(!grid.references(&TableRef::parse("orders")));
    }
}
