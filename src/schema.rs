//! Schema inference: the peek pipeline.
//!
//! An upload of unknown provenance goes through four steps, each
//! reading from the top and rewinding after itself: the blank check,
//! dialect sniffing, header parsing, and a bounded sample pass that
//! types every column.

use std::io::{Read, Seek};

use foldhash::{HashMap, HashSet, HashSetExt};

use crate::column::{Column, ColumnType, ROW_ID_COLUMN_NAME, SNIFF_ORDER};
use crate::conv::converters::{BooleanConverter, DateConverter, FloatConverter, IntegerConverter};
use crate::dialect::{Dialect, ensure_not_blank, sniff_dialect};
use crate::error::{PeekError, Result};
use crate::streams::{DecodedReader, decode_stream};

/// How many data rows are sampled for type inference, unless a
/// [`Peeker`] says otherwise.
pub const SAMPLE_ROWS: usize = 1000;

/// Everything learned about an upload in one pass.
pub struct Peeked<R> {
    /// The sniffed dialect.
    pub dialect: Dialect,
    /// Inferred (or validated) columns, in file order.
    pub columns: Vec<Column>,
    /// The upload, decoded and rewound, ready for row reading.
    pub text: DecodedReader<R>,
}

/// Configurable front end to the pipeline.
///
/// The defaults suit a one-shot upload; lower the sample cap when
/// peeking at many files cheaply.
///
/// ```no_run
/// use std::fs::File;
/// use csvpeek::Peeker;
///
/// let mut peeker = Peeker::new();
/// peeker.sample_rows(100);
/// let peeked = peeker.peek(File::open("data.csv").unwrap(), None).unwrap();
/// ```
pub struct Peeker {
    sample_rows: usize,
}

impl Peeker {
    pub fn new() -> Self {
        Peeker {
            sample_rows: SAMPLE_ROWS,
        }
    }

    /// Cap the number of data rows sampled for type inference.
    pub fn sample_rows(&mut self, rows: usize) -> &mut Self {
        self.sample_rows = rows;
        self
    }

    /// Decode `stream` and infer its schema in one call.
    ///
    /// This is the front door for a raw upload: charset detection,
    /// transcoding, blank check, dialect sniffing and column typing,
    /// with the decoded stream handed back rewound for row reading.
    pub fn peek<R>(&self, stream: R, existing_columns: Option<&[Column]>) -> Result<Peeked<R>>
    where
        R: Read + Seek,
    {
        let mut text = decode_stream(stream)?;
        let (dialect, columns) = self.infer_schema(&mut text, existing_columns)?;
        Ok(Peeked {
            dialect,
            columns,
            text,
        })
    }

    /// Infer (or validate) a schema for the decoded upload.
    ///
    /// With `existing_columns` the sample pass is skipped: file headers
    /// are resolved against those columns instead and returned in file
    /// order, failing with `SchemaMismatch` on any header the table
    /// does not have. Without them, every column is typed from a sample
    /// of up to the configured number of records.
    ///
    /// The reader is rewound on every exit path.
    pub fn infer_schema<R>(
        &self,
        text: &mut DecodedReader<R>,
        existing_columns: Option<&[Column]>,
    ) -> Result<(Dialect, Vec<Column>)>
    where
        R: Read + Seek,
    {
        ensure_not_blank(text)?;
        let dialect = sniff_dialect(text)?;
        let columns = text.with_rewind(|text| {
            read_columns(text, &dialect, existing_columns, self.sample_rows)
        })?;
        Ok((dialect, columns))
    }
}

impl Default for Peeker {
    fn default() -> Self {
        Self::new()
    }
}

/// [`Peeker::peek`] with the default settings.
pub fn peek<R>(stream: R, existing_columns: Option<&[Column]>) -> Result<Peeked<R>>
where
    R: Read + Seek,
{
    Peeker::new().peek(stream, existing_columns)
}

/// [`Peeker::infer_schema`] with the default settings.
pub fn infer_schema<R>(
    text: &mut DecodedReader<R>,
    existing_columns: Option<&[Column]>,
) -> Result<(Dialect, Vec<Column>)>
where
    R: Read + Seek,
{
    Peeker::new().infer_schema(text, existing_columns)
}

fn read_columns<R>(
    text: &mut DecodedReader<R>,
    dialect: &Dialect,
    existing_columns: Option<&[Column]>,
    sample_rows: usize,
) -> Result<Vec<Column>>
where
    R: Read + Seek,
{
    let mut builder = dialect.reader_builder();
    builder.has_headers(false).flexible(true);
    let mut reader = builder.from_reader(text);

    let mut record = csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Err(PeekError::BlankInput);
    }
    let headers = assign_headers(&record);

    let mut seen: HashSet<&str> = HashSet::with_capacity(headers.len());
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(PeekError::DuplicateHeader {
                column: header.clone(),
            });
        }
    }

    if let Some(existing) = existing_columns {
        return resolve_existing(&headers, existing);
    }

    // Sample pass: distinct cell values per column. Ragged records are
    // tolerated here; extra fields are ignored and missing ones simply
    // contribute nothing.
    let mut value_sets: Vec<HashSet<String>> = vec![HashSet::new(); headers.len()];
    let mut sampled = 0;
    while sampled < sample_rows && reader.read_record(&mut record)? {
        for (i, cell) in record.iter().enumerate().take(value_sets.len()) {
            let set = &mut value_sets[i];
            if !set.contains(cell) {
                set.insert(cell.to_string());
            }
        }
        sampled += 1;
    }
    tracing::debug!(columns = headers.len(), sampled, "sampled upload for typing");

    Ok(headers
        .into_iter()
        .zip(&value_sets)
        .map(|(name, values)| {
            let column_type = infer_column_type(&name, values);
            Column::new(name, column_type)
        })
        .collect())
}

/// Header names from the first record, with empty cells replaced by
/// 1-based `col1`, `col2`, ... placeholders.
fn assign_headers(record: &csv::StringRecord) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(i, header)| {
            if header.is_empty() {
                format!("col{}", i + 1)
            } else {
                header.to_string()
            }
        })
        .collect()
}

/// Resolve file headers against a table's declared columns, keeping
/// file order. Reordered and missing-column files are fine; an
/// unknown header is not.
fn resolve_existing(headers: &[String], existing: &[Column]) -> Result<Vec<Column>> {
    let by_name: HashMap<&str, &Column> = existing
        .iter()
        .map(|column| (column.name.as_str(), column))
        .collect();
    headers
        .iter()
        .map(|header| match by_name.get(header.as_str()) {
            Some(column) => Ok((*column).clone()),
            None => Err(PeekError::SchemaMismatch {
                column: header.clone(),
            }),
        })
        .collect()
}

/// Pick a type for one column from its sampled values: the first
/// sniffer in preference order that accepts them, text otherwise. The
/// reserved row-id name short-circuits to integer.
fn infer_column_type(name: &str, values: &HashSet<String>) -> ColumnType {
    if name == ROW_ID_COLUMN_NAME {
        return ColumnType::Integer;
    }
    SNIFF_ORDER
        .into_iter()
        .find(|candidate| sniff_type(*candidate, values))
        .unwrap_or(ColumnType::Text)
}

fn sniff_type(column_type: ColumnType, values: &HashSet<String>) -> bool {
    let values = values.iter().map(String::as_str);
    match column_type {
        ColumnType::Integer => IntegerConverter.sniff(values),
        ColumnType::Float => FloatConverter.sniff(values),
        ColumnType::Boolean => BooleanConverter.sniff(values),
        ColumnType::Date => DateConverter.sniff(values),
        ColumnType::Text => true,
    }
}
