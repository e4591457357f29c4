//! The sniff/convert engine: one stateless unit per column type.

pub mod blanks;
pub mod converters;
pub mod patterns;

pub use blanks::matches_with_blanks;
pub use converters::{
    BooleanConverter, DateConverter, FloatConverter, IntegerConverter, TextConverter,
};

use crate::column::ColumnType;
use crate::error::Result;
use crate::value::TypedValue;

/// Convert one raw cell to its column's already-decided type.
///
/// The type decision is authoritative here: a cell that does not parse
/// fails with `UnconvertableValue` instead of being coerced to text.
/// Empty and whitespace-only cells become [`TypedValue::Blank`] in
/// every column type except text.
pub fn convert_cell(column_type: ColumnType, raw: &str) -> Result<TypedValue> {
    match column_type {
        ColumnType::Integer => IntegerConverter.convert(raw),
        ColumnType::Float => FloatConverter.convert(raw),
        ColumnType::Boolean => BooleanConverter.convert(raw),
        ColumnType::Date => DateConverter.convert(raw),
        ColumnType::Text => TextConverter.convert(raw),
    }
}
