//! Strict row reading: every data record converted to typed values.

use std::io::{Read, Seek};

use foldhash::HashMapExt;

use crate::column::Column;
use crate::conv::convert_cell;
use crate::dialect::Dialect;
use crate::error::{PeekError, Result};
use crate::streams::DecodedReader;
use crate::value::Row;

/// Iterates an upload's data records as converted [`Row`]s.
///
/// Unlike the sampling passes, parsing here is strict: a record with
/// more or fewer fields than the header yields an error, as does the
/// first cell that fails conversion. After yielding an error the
/// iterator is fused and returns `None`.
///
/// The header record is consumed and discarded at construction; the
/// reader starts from the top of the stream regardless of where the
/// caller left it.
pub struct RowReader<'a, R: Read + Seek> {
    reader: csv::Reader<&'a mut DecodedReader<R>>,
    columns: Vec<Column>,
    record: csv::StringRecord,
    failed: bool,
}

impl<'a, R: Read + Seek> RowReader<'a, R> {
    /// Start reading `text` under `dialect`. `columns` must be in file
    /// order, as returned by schema inference.
    pub fn new(
        text: &'a mut DecodedReader<R>,
        dialect: &Dialect,
        columns: &[Column],
    ) -> Result<Self> {
        text.rewind()?;
        let mut builder = dialect.reader_builder();
        builder.has_headers(false).flexible(false);
        let mut reader = builder.from_reader(text);
        let mut record = csv::StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Err(PeekError::BlankInput);
        }
        Ok(RowReader {
            reader,
            columns: columns.to_vec(),
            record,
            failed: false,
        })
    }

    fn convert_record(&self) -> Result<Row> {
        let mut row = Row::with_capacity(self.columns.len());
        for (column, cell) in self.columns.iter().zip(self.record.iter()) {
            let value = convert_cell(column.column_type, cell)?;
            row.insert(column.clone(), value);
        }
        Ok(row)
    }
}

impl<R: Read + Seek> Iterator for RowReader<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let outcome = match self.reader.read_record(&mut self.record) {
            Ok(true) => self.convert_record(),
            Ok(false) => return None,
            Err(error) => Err(error.into()),
        };
        if outcome.is_err() {
            self.failed = true;
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnType;
    use crate::value::TypedValue;
    use std::io::Cursor;

    fn text_reader(content: &str) -> DecodedReader<Cursor<Vec<u8>>> {
        DecodedReader::new(Cursor::new(content.as_bytes().to_vec()), encoding_rs::UTF_8)
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("id", ColumnType::Integer),
            Column::new("name", ColumnType::Text),
        ]
    }

    #[test]
    fn test_reads_typed_rows() {
        let mut text = text_reader("id,name\n1,Ana\n2,Ben\n");
        let columns = columns();
        let rows: Vec<Row> = RowReader::new(&mut text, &Dialect::default(), &columns)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][&columns[0]], TypedValue::Integer(1));
        assert_eq!(rows[0][&columns[1]], TypedValue::Text("Ana".into()));
        assert_eq!(rows[1][&columns[0]], TypedValue::Integer(2));
    }

    #[test]
    fn test_blank_cells_become_blank_values() {
        let mut text = text_reader("id,name\n,Ana\n");
        let columns = columns();
        let rows: Vec<Row> = RowReader::new(&mut text, &Dialect::default(), &columns)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows[0][&columns[0]], TypedValue::Blank);
    }

    #[test]
    fn test_unconvertable_cell_stops_iteration() {
        let mut text = text_reader("id,name\n1,Ana\nnope,Ben\n3,Che\n");
        let columns = columns();
        let mut reader = RowReader::new(&mut text, &Dialect::default(), &columns).unwrap();
        assert!(reader.next().unwrap().is_ok());
        let error = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            error,
            PeekError::UnconvertableValue { expected, raw }
                if expected == ColumnType::Integer && raw == "nope"
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_ragged_record_is_an_error() {
        let mut text = text_reader("id,name\n1,Ana,extra\n");
        let columns = columns();
        let mut reader = RowReader::new(&mut text, &Dialect::default(), &columns).unwrap();
        let error = reader.next().unwrap().unwrap_err();
        assert!(matches!(error, PeekError::Csv(_)));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_starts_from_the_top_even_after_reads() {
        let mut text = text_reader("id,name\n1,Ana\n");
        // Disturb the position first; the reader must not care.
        let mut scratch = [0u8; 4];
        text.read_exact(&mut scratch).unwrap();
        let columns = columns();
        let rows: Vec<Row> = RowReader::new(&mut text, &Dialect::default(), &columns)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let mut text = text_reader("id,name\n");
        let columns = columns();
        let mut reader = RowReader::new(&mut text, &Dialect::default(), &columns).unwrap();
        assert!(reader.next().is_none());
    }
}
