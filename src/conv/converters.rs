//! Per-type sniffers and authoritative converters.
//!
//! Each converter answers two questions: `sniff` decides from a column
//! sample whether the type is plausible, `convert` turns one raw cell
//! into a [`TypedValue`] or fails with `UnconvertableValue`. A sniff
//! is a superset check, so `convert` can still reject values the
//! pattern let through (overflow, impossible dates, stray interior
//! spaces).

use chrono::NaiveDate;

use super::blanks::matches_with_blanks;
use super::patterns::{
    BOOLEAN_PATTERN, DATE_PATTERN, FALSE_PATTERN, FLOAT_PATTERN, INTEGER_PATTERN, TRUE_PATTERN,
};
use crate::column::ColumnType;
use crate::error::{PeekError, Result};
use crate::value::TypedValue;

fn unconvertable(expected: ColumnType, raw: &str) -> PeekError {
    PeekError::UnconvertableValue {
        expected,
        raw: raw.to_string(),
    }
}

/// Sniffs and converts integer cells (`1`, `-2`, `1,234`).
pub struct IntegerConverter;

impl IntegerConverter {
    pub fn sniff<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        matches_with_blanks(&INTEGER_PATTERN, values)
    }

    pub fn convert(&self, value: &str) -> Result<TypedValue> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(TypedValue::Blank);
        }
        if !INTEGER_PATTERN.is_match(value) {
            return Err(unconvertable(ColumnType::Integer, value));
        }
        trimmed
            .replace(',', "")
            .parse::<i64>()
            .map(TypedValue::Integer)
            .map_err(|_| unconvertable(ColumnType::Integer, value))
    }
}

/// Sniffs and converts float cells (`3.14`, `-1,000.5`).
pub struct FloatConverter;

impl FloatConverter {
    pub fn sniff<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        matches_with_blanks(&FLOAT_PATTERN, values)
    }

    pub fn convert(&self, value: &str) -> Result<TypedValue> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(TypedValue::Blank);
        }
        if !FLOAT_PATTERN.is_match(value) {
            return Err(unconvertable(ColumnType::Float, value));
        }
        trimmed
            .replace(',', "")
            .parse::<f64>()
            .map(TypedValue::Float)
            .map_err(|_| unconvertable(ColumnType::Float, value))
    }
}

/// Sniffs and converts boolean cells in their common spellings.
pub struct BooleanConverter;

impl BooleanConverter {
    pub fn sniff<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        matches_with_blanks(&BOOLEAN_PATTERN, values)
    }

    pub fn convert(&self, value: &str) -> Result<TypedValue> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(TypedValue::Blank);
        }
        if TRUE_PATTERN.is_match(trimmed) {
            Ok(TypedValue::Boolean(true))
        } else if FALSE_PATTERN.is_match(trimmed) {
            Ok(TypedValue::Boolean(false))
        } else {
            Err(unconvertable(ColumnType::Boolean, value))
        }
    }
}

/// Sniffs and converts ISO-8601 date cells.
pub struct DateConverter;

impl DateConverter {
    pub fn sniff<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        matches_with_blanks(&DATE_PATTERN, values)
    }

    pub fn convert(&self, value: &str) -> Result<TypedValue> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(TypedValue::Blank);
        }
        if !DATE_PATTERN.is_match(value) {
            return Err(unconvertable(ColumnType::Date, value));
        }
        // The pattern only checks shape; chrono rejects impossible
        // dates like 2018-02-30.
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(TypedValue::Date)
            .map_err(|_| unconvertable(ColumnType::Date, value))
    }
}

/// The fallback: every cell is already text.
pub struct TextConverter;

impl TextConverter {
    pub fn sniff<'a, I>(&self, _values: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        true
    }

    pub fn convert(&self, value: &str) -> Result<TypedValue> {
        Ok(TypedValue::Text(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_sniff() {
        assert!(IntegerConverter.sniff(["1", "-2", "1,234", ""]));
        assert!(!IntegerConverter.sniff(["1", "2.5"]));
        assert!(!IntegerConverter.sniff(["", " "]));
    }

    #[test]
    fn test_integer_convert() {
        assert_eq!(
            IntegerConverter.convert("1,234").unwrap(),
            TypedValue::Integer(1234)
        );
        assert_eq!(
            IntegerConverter.convert(" -7").unwrap(),
            TypedValue::Integer(-7)
        );
        assert_eq!(IntegerConverter.convert("   ").unwrap(), TypedValue::Blank);
        assert!(IntegerConverter.convert("12.5").is_err());
        assert!(IntegerConverter.convert("abc").is_err());
    }

    #[test]
    fn test_integer_convert_rejects_pattern_noise() {
        // The sniffing pattern is looser than i64: these match it but
        // must still fail conversion.
        assert!(IntegerConverter.convert("1 234").is_err());
        assert!(IntegerConverter.convert(",,").is_err());
        assert!(IntegerConverter.convert("99999999999999999999").is_err());
    }

    #[test]
    fn test_float_convert() {
        assert_eq!(
            FloatConverter.convert("3.14").unwrap(),
            TypedValue::Float(3.14)
        );
        assert_eq!(
            FloatConverter.convert("-1,000.5").unwrap(),
            TypedValue::Float(-1000.5)
        );
        assert_eq!(FloatConverter.convert("").unwrap(), TypedValue::Blank);
        assert!(FloatConverter.convert("1.2.3").is_err());
        assert!(FloatConverter.convert("1e10").is_err());
    }

    #[test]
    fn test_boolean_convert_spellings() {
        for spelling in ["TRUE", "true", "T", "yes", "Y", " y "] {
            assert_eq!(
                BooleanConverter.convert(spelling).unwrap(),
                TypedValue::Boolean(true),
                "expected {spelling:?} to be true"
            );
        }
        for spelling in ["FALSE", "false", "f", "NO", "n"] {
            assert_eq!(
                BooleanConverter.convert(spelling).unwrap(),
                TypedValue::Boolean(false),
                "expected {spelling:?} to be false"
            );
        }
        assert!(BooleanConverter.convert("maybe").is_err());
        assert!(BooleanConverter.convert("0").is_err());
    }

    #[test]
    fn test_date_convert() {
        let expected = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        assert_eq!(
            DateConverter.convert("2018-01-03").unwrap(),
            TypedValue::Date(expected)
        );
        assert_eq!(
            DateConverter.convert(" 2018-01-03 ").unwrap(),
            TypedValue::Date(expected)
        );
        assert_eq!(DateConverter.convert("").unwrap(), TypedValue::Blank);
        // Right shape, impossible calendar date.
        assert!(DateConverter.convert("2018-02-30").is_err());
        assert!(DateConverter.convert("2018-1-3").is_err());
        assert!(DateConverter.convert("03/01/2018").is_err());
    }

    #[test]
    fn test_text_is_identity() {
        assert!(TextConverter.sniff(["anything", "at all"]));
        assert_eq!(
            TextConverter.convert(" padded ").unwrap(),
            TypedValue::Text(" padded ".into())
        );
        // Empty text stays text, not blank.
        assert_eq!(
            TextConverter.convert("").unwrap(),
            TypedValue::Text(String::new())
        );
    }

    #[test]
    fn test_unconvertable_error_carries_context() {
        let err = IntegerConverter.convert("abc").unwrap_err();
        match err {
            PeekError::UnconvertableValue { expected, raw } => {
                assert_eq!(expected, ColumnType::Integer);
                assert_eq!(raw, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
