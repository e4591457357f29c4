//! Keyset pagination value types.
//!
//! Pages are addressed by a [`KeySet`]: the sort-key values of the row
//! just before (or after) the rows wanted, never a numeric offset, so
//! paging stays stable while rows are inserted and deleted underneath.

use crate::column::{Column, row_id_column};
use crate::error::{PeekError, Result};
use crate::value::{Row, TypedValue};

/// Rows per page when the caller does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which side of the keyset values a page is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySetOp {
    /// Rows strictly after the keyset values (paging forward).
    GreaterThan,
    /// Rows strictly before the keyset values (paging backward).
    LessThan,
}

/// A position in a table's sort order plus a direction and page size.
///
/// Invariants are enforced at construction: at least one column, one
/// value per column, and a positive size.
#[derive(Debug, Clone)]
pub struct KeySet {
    columns: Vec<Column>,
    values: Vec<TypedValue>,
    op: KeySetOp,
    size: usize,
}

impl KeySet {
    pub fn new(
        columns: Vec<Column>,
        values: Vec<TypedValue>,
        op: KeySetOp,
        size: usize,
    ) -> Result<Self> {
        if columns.is_empty() {
            return Err(PeekError::InvalidKeySet(
                "at least one key column is required".into(),
            ));
        }
        if columns.len() != values.len() {
            return Err(PeekError::InvalidKeySet(format!(
                "{} key columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        if size == 0 {
            return Err(PeekError::InvalidKeySet("page size must be positive".into()));
        }
        Ok(KeySet {
            columns,
            values,
            op,
            size,
        })
    }

    /// The first page of a table in row-id order: everything after
    /// row id 0, which is below every real row id.
    pub fn first_page(size: usize) -> Result<Self> {
        KeySet::new(
            vec![row_id_column()],
            vec![TypedValue::Integer(0)],
            KeySetOp::GreaterThan,
            size,
        )
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    pub fn op(&self) -> KeySetOp {
        self.op
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for KeySet {
    /// The first page, [`DEFAULT_PAGE_SIZE`] rows.
    fn default() -> Self {
        KeySet {
            columns: vec![row_id_column()],
            values: vec![TypedValue::Integer(0)],
            op: KeySetOp::GreaterThan,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of rows, with flags saying whether more exist on either
/// side.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Rows exist before this page.
    pub has_less: bool,
    /// Rows exist after this page.
    pub has_more: bool,
    /// The rows, in ascending key order.
    pub rows: Vec<Row>,
}

impl Page {
    /// Row ids present on this page, in page order. Rows without a
    /// row-id value (not yet persisted) are skipped.
    pub fn row_ids(&self) -> Vec<i64> {
        let row_id = row_id_column();
        self.rows
            .iter()
            .filter_map(|row| match row.get(&row_id) {
                Some(TypedValue::Integer(id)) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

/// A table's row count: an exact number when known, an estimate
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCount {
    /// The exact count, when it was affordable to compute.
    pub exact: Option<i64>,
    /// A cheap estimate, always present.
    pub approx: i64,
}

impl RowCount {
    pub fn new(exact: Option<i64>, approx: i64) -> Self {
        RowCount { exact, approx }
    }

    /// The best number available: exact if known, the estimate
    /// otherwise.
    pub fn best(&self) -> i64 {
        self.exact.unwrap_or(self.approx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use foldhash::HashMapExt;

    #[test]
    fn test_keyset_validation() {
        let column = row_id_column();
        assert!(
            KeySet::new(
                vec![column.clone()],
                vec![TypedValue::Integer(5)],
                KeySetOp::GreaterThan,
                10,
            )
            .is_ok()
        );
        assert!(matches!(
            KeySet::new(vec![], vec![], KeySetOp::GreaterThan, 10),
            Err(PeekError::InvalidKeySet(_))
        ));
        assert!(matches!(
            KeySet::new(
                vec![column.clone()],
                vec![TypedValue::Integer(5), TypedValue::Integer(6)],
                KeySetOp::GreaterThan,
                10,
            ),
            Err(PeekError::InvalidKeySet(_))
        ));
        assert!(matches!(
            KeySet::new(
                vec![column],
                vec![TypedValue::Integer(5)],
                KeySetOp::GreaterThan,
                0,
            ),
            Err(PeekError::InvalidKeySet(_))
        ));
    }

    #[test]
    fn test_default_keyset() {
        let keyset = KeySet::default();
        assert_eq!(keyset.size(), DEFAULT_PAGE_SIZE);
        assert_eq!(keyset.op(), KeySetOp::GreaterThan);
        assert_eq!(keyset.columns()[0].name, "csvpeek_row_id");
        assert_eq!(keyset.values()[0], TypedValue::Integer(0));
    }

    #[test]
    fn test_page_row_ids() {
        let row_id = row_id_column();
        let name = Column::new("name", ColumnType::Text);
        let mut first = Row::new();
        first.insert(row_id.clone(), TypedValue::Integer(1));
        first.insert(name.clone(), TypedValue::Text("Ana".into()));
        let mut second = Row::new();
        second.insert(row_id.clone(), TypedValue::Integer(2));
        second.insert(name.clone(), TypedValue::Text("Ben".into()));
        // A row that never went through storage has no id yet.
        let mut unsaved = Row::new();
        unsaved.insert(name, TypedValue::Text("Che".into()));

        let page = Page {
            has_less: false,
            has_more: true,
            rows: vec![first, second, unsaved],
        };
        assert_eq!(page.row_ids(), vec![1, 2]);
    }

    #[test]
    fn test_row_count_best() {
        assert_eq!(RowCount::new(Some(120), 100).best(), 120);
        assert_eq!(RowCount::new(None, 100).best(), 100);
    }
}
