//! Typed cell values and rows.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::column::{Column, ColumnType};

/// A single converted cell.
///
/// `Blank` is what an empty (or whitespace-only) cell converts to in a
/// non-text column; it round-trips back out as the empty string.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    Text(String),
    Blank,
}

impl TypedValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, TypedValue::Blank)
    }

    /// The column type this value belongs to, or `None` for `Blank`
    /// (a blank carries no type of its own).
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            TypedValue::Integer(_) => Some(ColumnType::Integer),
            TypedValue::Float(_) => Some(ColumnType::Float),
            TypedValue::Boolean(_) => Some(ColumnType::Boolean),
            TypedValue::Date(_) => Some(ColumnType::Date),
            TypedValue::Text(_) => Some(ColumnType::Text),
            TypedValue::Blank => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Integer(i) => write!(f, "{i}"),
            TypedValue::Float(x) => write!(f, "{x}"),
            TypedValue::Boolean(b) => write!(f, "{b}"),
            TypedValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            TypedValue::Text(s) => write!(f, "{s}"),
            TypedValue::Blank => Ok(()),
        }
    }
}

/// Values of the same variant compare by their payload; values of
/// different variants (and anything against `Blank`, except `Blank`
/// itself) do not compare. Keyset paging relies on this being a total
/// order within one column's type.
impl PartialOrd for TypedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (TypedValue::Integer(a), TypedValue::Integer(b)) => a.partial_cmp(b),
            (TypedValue::Float(a), TypedValue::Float(b)) => a.partial_cmp(b),
            (TypedValue::Boolean(a), TypedValue::Boolean(b)) => a.partial_cmp(b),
            (TypedValue::Date(a), TypedValue::Date(b)) => a.partial_cmp(b),
            (TypedValue::Text(a), TypedValue::Text(b)) => a.partial_cmp(b),
            (TypedValue::Blank, TypedValue::Blank) => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl From<i64> for TypedValue {
    fn from(i: i64) -> Self {
        TypedValue::Integer(i)
    }
}

impl From<f64> for TypedValue {
    fn from(x: f64) -> Self {
        TypedValue::Float(x)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Boolean(b)
    }
}

impl From<NaiveDate> for TypedValue {
    fn from(d: NaiveDate) -> Self {
        TypedValue::Date(d)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::Text(s.to_string())
    }
}

/// One converted row: column -> value.
pub type Row = foldhash::HashMap<Column, TypedValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_through_text() {
        assert_eq!(TypedValue::Integer(-42).to_string(), "-42");
        assert_eq!(TypedValue::Float(3.14).to_string(), "3.14");
        assert_eq!(TypedValue::Boolean(true).to_string(), "true");
        assert_eq!(TypedValue::Text("hi".into()).to_string(), "hi");
        assert_eq!(TypedValue::Blank.to_string(), "");
        let date = NaiveDate::from_ymd_opt(2018, 1, 3).unwrap();
        assert_eq!(TypedValue::Date(date).to_string(), "2018-01-03");
    }

    #[test]
    fn test_same_variant_ordering() {
        assert!(TypedValue::Integer(1) < TypedValue::Integer(2));
        assert!(TypedValue::Text("a".into()) < TypedValue::Text("b".into()));
        let earlier = TypedValue::Date(NaiveDate::from_ymd_opt(2018, 1, 3).unwrap());
        let later = TypedValue::Date(NaiveDate::from_ymd_opt(2019, 1, 3).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn test_cross_variant_does_not_compare() {
        let int = TypedValue::Integer(1);
        let text = TypedValue::Text("1".into());
        assert_eq!(int.partial_cmp(&text), None);
        assert_eq!(TypedValue::Blank.partial_cmp(&int), None);
        assert_eq!(
            TypedValue::Blank.partial_cmp(&TypedValue::Blank),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_column_type_of_value() {
        assert_eq!(
            TypedValue::Float(0.5).column_type(),
            Some(ColumnType::Float)
        );
        assert_eq!(TypedValue::Blank.column_type(), None);
    }
}
