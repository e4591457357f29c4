//! The storage boundary: where converted rows go and pages come from.

use std::cmp::Ordering;

use crate::column::{Column, ROW_ID_COLUMN_NAME, row_id_column};
use crate::error::{PeekError, Result};
use crate::page::{KeySet, KeySetOp, Page, RowCount};
use crate::value::{Row, TypedValue};

/// Identifier a store assigns to each inserted row.
pub type RowId = i64;

/// Where tables live.
///
/// The peek pipeline ends here: a schema is persisted once, then
/// converted rows stream in one at a time. Reading back is a page at
/// a time, addressed by keyset.
pub trait TableStore {
    /// Whatever the store uses to name a created table.
    type Handle;

    /// Create a table with these columns. The row-id column is implied
    /// and becomes the first column whether or not it is present in
    /// `columns`.
    fn persist_schema(&mut self, columns: &[Column]) -> Result<Self::Handle>;

    /// Insert one converted row, returning its row id. A row carrying
    /// an explicit integer row-id value keeps it; any other row is
    /// assigned the next free id.
    fn insert_row(&mut self, table: &Self::Handle, row: Row) -> Result<RowId>;

    /// Read one page of rows addressed by `keyset`.
    fn query_page(&self, table: &Self::Handle, keyset: &KeySet) -> Result<Page>;

    /// How many rows the table has.
    fn row_count(&self, table: &Self::Handle) -> Result<RowCount>;
}

/// An in-memory [`TableStore`]: the reference implementation, also
/// what the test-suite imports into.
#[derive(Default)]
pub struct MemoryStore {
    tables: Vec<MemoryTable>,
}

struct MemoryTable {
    columns: Vec<Column>,
    rows: Vec<Row>,
    next_row_id: RowId,
}

/// Handle into a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryHandle(usize);

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// The table's columns, row-id first.
    pub fn columns(&self, table: &MemoryHandle) -> Result<Vec<Column>> {
        Ok(self.table(table)?.columns.clone())
    }

    /// Every row in insertion order, for assertions.
    pub fn all_rows(&self, table: &MemoryHandle) -> Result<Vec<Row>> {
        Ok(self.table(table)?.rows.clone())
    }

    fn table(&self, handle: &MemoryHandle) -> Result<&MemoryTable> {
        self.tables
            .get(handle.0)
            .ok_or_else(|| PeekError::Storage(format!("no such table: {}", handle.0)))
    }

    fn table_mut(&mut self, handle: &MemoryHandle) -> Result<&mut MemoryTable> {
        self.tables
            .get_mut(handle.0)
            .ok_or_else(|| PeekError::Storage(format!("no such table: {}", handle.0)))
    }
}

impl TableStore for MemoryStore {
    type Handle = MemoryHandle;

    fn persist_schema(&mut self, columns: &[Column]) -> Result<MemoryHandle> {
        let mut table_columns = vec![row_id_column()];
        table_columns.extend(
            columns
                .iter()
                .filter(|column| column.name != ROW_ID_COLUMN_NAME)
                .cloned(),
        );
        self.tables.push(MemoryTable {
            columns: table_columns,
            rows: Vec::new(),
            next_row_id: 1,
        });
        Ok(MemoryHandle(self.tables.len() - 1))
    }

    fn insert_row(&mut self, table: &MemoryHandle, mut row: Row) -> Result<RowId> {
        let table = self.table_mut(table)?;
        let row_id = row_id_column();
        let id = match row.get(&row_id) {
            Some(TypedValue::Integer(id)) => {
                let id = *id;
                table.next_row_id = table.next_row_id.max(id + 1);
                id
            }
            _ => {
                let id = table.next_row_id;
                table.next_row_id += 1;
                row.insert(row_id, TypedValue::Integer(id));
                id
            }
        };
        table.rows.push(row);
        Ok(id)
    }

    fn query_page(&self, table: &MemoryHandle, keyset: &KeySet) -> Result<Page> {
        let table = self.table(table)?;

        // Decorate rows with their key tuples; rows missing a key
        // column are invisible to this keyset.
        let mut keyed: Vec<(Vec<TypedValue>, &Row)> = Vec::new();
        for row in &table.rows {
            let key: Option<Vec<TypedValue>> = keyset
                .columns()
                .iter()
                .map(|column| row.get(column).cloned())
                .collect();
            if let Some(key) = key {
                keyed.push((key, row));
            }
        }
        keyed.sort_by(|(a, _), (b, _)| compare_key_tuples(a, b));

        let mut less: Vec<&Row> = Vec::new();
        let mut greater: Vec<&Row> = Vec::new();
        let mut any_equal = false;
        for (key, row) in keyed {
            match compare_with_values(&key, keyset.values()) {
                Some(Ordering::Less) => less.push(row),
                Some(Ordering::Greater) => greater.push(row),
                Some(Ordering::Equal) => any_equal = true,
                None => {}
            }
        }

        let size = keyset.size();
        let page = match keyset.op() {
            KeySetOp::GreaterThan => Page {
                has_less: any_equal || !less.is_empty(),
                has_more: greater.len() > size,
                rows: greater.iter().take(size).map(|row| (*row).clone()).collect(),
            },
            KeySetOp::LessThan => {
                // The page closest to the anchor: the last `size`
                // rows below it, still in ascending order.
                let start = less.len().saturating_sub(size);
                Page {
                    has_less: start > 0,
                    has_more: any_equal || !greater.is_empty(),
                    rows: less[start..].iter().map(|row| (*row).clone()).collect(),
                }
            }
        };
        Ok(page)
    }

    fn row_count(&self, table: &MemoryHandle) -> Result<RowCount> {
        let table = self.table(table)?;
        let count = table.rows.len() as i64;
        Ok(RowCount::new(Some(count), count))
    }
}

fn compare_key_tuples(a: &[TypedValue], b: &[TypedValue]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.partial_cmp(y).unwrap_or(Ordering::Equal) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn compare_with_values(key: &[TypedValue], values: &[TypedValue]) -> Option<Ordering> {
    for (k, v) in key.iter().zip(values) {
        match k.partial_cmp(v)? {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use foldhash::HashMapExt;

    fn seeded_store() -> (MemoryStore, MemoryHandle, Column) {
        let name = Column::new("name", ColumnType::Text);
        let mut store = MemoryStore::new();
        let table = store.persist_schema(std::slice::from_ref(&name)).unwrap();
        for who in ["Ana", "Ben", "Che", "Dee", "Eva"] {
            let mut row = Row::new();
            row.insert(name.clone(), TypedValue::Text(who.into()));
            store.insert_row(&table, row).unwrap();
        }
        (store, table, name)
    }

    #[test]
    fn test_schema_gets_row_id_first() {
        let mut store = MemoryStore::new();
        let table = store
            .persist_schema(&[Column::new("a", ColumnType::Integer)])
            .unwrap();
        let columns = store.columns(&table).unwrap();
        assert_eq!(columns[0], row_id_column());
        assert_eq!(columns[1].name, "a");
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_row_ids_are_assigned_from_one() {
        let (store, table, _) = seeded_store();
        let rows = store.all_rows(&table).unwrap();
        let ids: Vec<i64> = rows
            .iter()
            .filter_map(|row| match row.get(&row_id_column()) {
                Some(TypedValue::Integer(id)) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_explicit_row_id_is_kept() {
        let name = Column::new("name", ColumnType::Text);
        let mut store = MemoryStore::new();
        let table = store.persist_schema(std::slice::from_ref(&name)).unwrap();
        let mut row = Row::new();
        row.insert(row_id_column(), TypedValue::Integer(40));
        row.insert(name.clone(), TypedValue::Text("Ana".into()));
        assert_eq!(store.insert_row(&table, row).unwrap(), 40);
        // The next assigned id must not collide.
        let mut next = Row::new();
        next.insert(name, TypedValue::Text("Ben".into()));
        assert_eq!(store.insert_row(&table, next).unwrap(), 41);
    }

    #[test]
    fn test_first_page_and_paging_forward() {
        let (store, table, _) = seeded_store();
        let keyset = KeySet::first_page(2).unwrap();
        let page = store.query_page(&table, &keyset).unwrap();
        assert_eq!(page.row_ids(), vec![1, 2]);
        assert!(!page.has_less);
        assert!(page.has_more);

        let keyset = KeySet::new(
            vec![row_id_column()],
            vec![TypedValue::Integer(2)],
            KeySetOp::GreaterThan,
            2,
        )
        .unwrap();
        let page = store.query_page(&table, &keyset).unwrap();
        assert_eq!(page.row_ids(), vec![3, 4]);
        assert!(page.has_less);
        assert!(page.has_more);
    }

    #[test]
    fn test_last_page_has_no_more() {
        let (store, table, _) = seeded_store();
        let keyset = KeySet::new(
            vec![row_id_column()],
            vec![TypedValue::Integer(4)],
            KeySetOp::GreaterThan,
            10,
        )
        .unwrap();
        let page = store.query_page(&table, &keyset).unwrap();
        assert_eq!(page.row_ids(), vec![5]);
        assert!(page.has_less);
        assert!(!page.has_more);
    }

    #[test]
    fn test_paging_backward() {
        let (store, table, _) = seeded_store();
        let keyset = KeySet::new(
            vec![row_id_column()],
            vec![TypedValue::Integer(4)],
            KeySetOp::LessThan,
            2,
        )
        .unwrap();
        let page = store.query_page(&table, &keyset).unwrap();
        // The two rows just below the anchor, still ascending.
        assert_eq!(page.row_ids(), vec![2, 3]);
        assert!(page.has_less);
        assert!(page.has_more);

        let keyset = KeySet::new(
            vec![row_id_column()],
            vec![TypedValue::Integer(2)],
            KeySetOp::LessThan,
            5,
        )
        .unwrap();
        let page = store.query_page(&table, &keyset).unwrap();
        assert_eq!(page.row_ids(), vec![1]);
        assert!(!page.has_less);
        assert!(page.has_more);
    }

    #[test]
    fn test_empty_page_beyond_the_end() {
        let (store, table, _) = seeded_store();
        let keyset = KeySet::new(
            vec![row_id_column()],
            vec![TypedValue::Integer(99)],
            KeySetOp::GreaterThan,
            10,
        )
        .unwrap();
        let page = store.query_page(&table, &keyset).unwrap();
        assert!(page.rows.is_empty());
        assert!(page.has_less);
        assert!(!page.has_more);
    }

    #[test]
    fn test_paging_by_a_text_column() {
        let (store, table, name) = seeded_store();
        let keyset = KeySet::new(
            vec![name],
            vec![TypedValue::Text("Ben".into())],
            KeySetOp::GreaterThan,
            2,
        )
        .unwrap();
        let page = store.query_page(&table, &keyset).unwrap();
        assert_eq!(page.rows.len(), 2);
        assert!(page.has_less);
        assert!(page.has_more);
    }

    #[test]
    fn test_row_count_is_exact() {
        let (store, table, _) = seeded_store();
        let count = store.row_count(&table).unwrap();
        assert_eq!(count.exact, Some(5));
        assert_eq!(count.best(), 5);
    }

    #[test]
    fn test_unknown_handle_is_a_storage_error() {
        let store = MemoryStore::new();
        let bogus = MemoryHandle(7);
        assert!(matches!(
            store.row_count(&bogus),
            Err(PeekError::Storage(_))
        ));
    }
}
