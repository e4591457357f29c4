//! End-to-end import: infer a schema, persist it, load every row.

use std::io::{Read, Seek};

use crate::column::Column;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::rows::RowReader;
use crate::schema::{self, Peeked};
use crate::storage::TableStore;
use crate::streams::DecodedReader;

/// Outcome of [`create_table`].
///
/// Holds the store's handle for the new table alongside the inferred
/// columns, which later [`append_rows`] calls take as the known schema.
#[derive(Debug)]
pub struct Imported<H> {
    /// Handle to the created table.
    pub table: H,
    /// Inferred columns, in file order.
    pub columns: Vec<Column>,
    /// Number of data rows loaded.
    pub rows_inserted: u64,
}

/// Create a table from an upload of unknown encoding, dialect and types.
///
/// Detects the encoding, sniffs the dialect, infers a column type for
/// every header, persists the schema and inserts each data row. Stops at
/// the first row that fails to parse or convert; rows inserted before
/// the failure are the store's concern to keep or roll back.
pub fn create_table<S, R>(store: &mut S, stream: R) -> Result<Imported<S::Handle>>
where
    S: TableStore,
    R: Read + Seek,
{
    let Peeked {
        dialect,
        columns,
        mut text,
    } = schema::peek(stream, None)?;
    let table = store.persist_schema(&columns)?;
    let rows_inserted = insert_all(store, &table, &mut text, &dialect, &columns)?;
    Ok(Imported {
        table,
        columns,
        rows_inserted,
    })
}

/// Append an upload's rows to an existing table.
///
/// The file's header decides which of `existing_columns` each field
/// belongs to, so uploads may reorder or omit columns. A header that
/// matches no existing column is a schema mismatch. Returns the number
/// of rows inserted; the abort behaviour matches [`create_table`].
pub fn append_rows<S, R>(
    store: &mut S,
    table: &S::Handle,
    existing_columns: &[Column],
    stream: R,
) -> Result<u64>
where
    S: TableStore,
    R: Read + Seek,
{
    let Peeked {
        dialect,
        columns,
        mut text,
    } = schema::peek(stream, Some(existing_columns))?;
    insert_all(store, table, &mut text, &dialect, &columns)
}

fn insert_all<S, R>(
    store: &mut S,
    table: &S::Handle,
    text: &mut DecodedReader<R>,
    dialect: &Dialect,
    columns: &[Column],
) -> Result<u64>
where
    S: TableStore,
    R: Read + Seek,
{
    let mut inserted = 0u64;
    for row in RowReader::new(text, dialect, columns)? {
        store.insert_row(table, row?)?;
        inserted += 1;
    }
    tracing::debug!(rows = inserted, "inserted all rows");
    Ok(inserted)
}
