//! csvpeek: schema inference and typed conversion for CSV uploads
//!
//! Takes a CSV file of unknown encoding, unknown dialect and untyped
//! cells, and works out how to read it: which character set it is in,
//! which delimiter and quote it uses, and which type each column holds.
//! The same machinery then converts every cell to a typed value, ready
//! to be loaded into a table store.
//!
//! # Quick start
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use csvpeek::peek;
//!
//! let file = BufReader::new(File::open("data.csv").unwrap());
//! let peeked = peek(file, None).unwrap();
//!
//! println!("encoding: {}", peeked.text.encoding().name());
//! println!("dialect: {}", peeked.dialect);
//! for column in &peeked.columns {
//!     println!("{column}");
//! }
//! ```
//!
//! # Loading into a store
//!
//! [`create_table`] runs the whole pipeline against any [`TableStore`];
//! the bundled [`MemoryStore`] keeps tables in memory and supports
//! keyset pagination:
//!
//! ```
//! use std::io::Cursor;
//!
//! use csvpeek::{create_table, KeySet, MemoryStore, TableStore};
//!
//! let mut store = MemoryStore::default();
//! let csv = b"name,age\nalice,34\nbob,29\n";
//! let imported = create_table(&mut store, Cursor::new(&csv[..])).unwrap();
//!
//! let page = store.query_page(&imported.table, &KeySet::default()).unwrap();
//! assert_eq!(page.rows.len(), 2);
//! ```
//!
//! # Sniff first, convert second
//!
//! Type inference runs in two phases:
//!
//! 1. During sampling, each column's values are matched against cheap
//!    regex patterns. The patterns are deliberately supersets of what
//!    the converters accept, so sniffing never rules out a parseable
//!    column. Blank cells are ignored as evidence, but an all-blank
//!    column is never assigned a non-text type.
//! 2. During conversion, the real parsers are authoritative. A cell
//!    that matched the pattern but fails to parse (say `2018-02-30`)
//!    is a [`PeekError::UnconvertableValue`], and a blank cell in a
//!    non-text column becomes [`TypedValue::Blank`].
//!
//! Candidate types are tried most-specific first: integer, then float,
//! boolean, date, with text as the fallback that always fits.

mod column;
pub mod conv;
mod dialect;
mod encoding;
mod error;
mod import;
mod page;
mod rows;
mod schema;
mod storage;
mod streams;
mod value;

// Re-export the import pipeline and its building blocks
pub use column::{row_id_column, Column, ColumnType, ROW_ID_COLUMN_NAME, SNIFF_ORDER};
pub use conv::convert_cell;
pub use dialect::{ensure_not_blank, sniff_dialect, Dialect, LineTerminator, Quote};
pub use error::{PeekError, Result};
pub use import::{append_rows, create_table, Imported};
pub use page::{KeySet, KeySetOp, Page, RowCount, DEFAULT_PAGE_SIZE};
pub use rows::RowReader;
pub use schema::{infer_schema, peek, Peeked, Peeker, SAMPLE_ROWS};
pub use storage::{MemoryHandle, MemoryStore, RowId, TableStore};
pub use value::{Row, TypedValue};

// Re-export the decoding layer, for callers bringing their own streams
pub use encoding::{
    detect_encoding, detect_encoding_with, CharsetDetector, ChardetngDetector, MAX_DETECT_BYTES,
};
pub use streams::{decode_stream, stream_length, with_rewind, DecodedReader};
