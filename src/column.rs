//! Column model: the five supported column types and the named,
//! typed columns that make up a table schema.

use std::fmt;

use chrono::NaiveDate;

use crate::value::TypedValue;

/// Name of the synthetic row-identifier column every table carries.
///
/// The name is reserved: a file header spelled exactly like this is
/// always typed [`ColumnType::Integer`], no matter what the cells hold.
pub const ROW_ID_COLUMN_NAME: &str = "csvpeek_row_id";

/// The row-identifier column itself, first column of every table.
pub fn row_id_column() -> Column {
    Column::new(ROW_ID_COLUMN_NAME, ColumnType::Integer)
}

/// Types a column can be inferred (or declared) to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Arbitrary text. The catch-all: every cell converts.
    Text,
    /// 64-bit signed integers, tolerating comma and space grouping.
    Integer,
    /// 64-bit floats, tolerating comma grouping.
    Float,
    /// Booleans in the common spellings (`true`, `f`, `YES`, `n`, ...).
    Boolean,
    /// ISO-8601 calendar dates (`2018-01-03`).
    Date,
}

/// Candidate types in inference order, most specific first. `Text`
/// is absent: it is the fallback when nothing here sniffs.
pub const SNIFF_ORDER: [ColumnType; 4] = [
    ColumnType::Integer,
    ColumnType::Float,
    ColumnType::Boolean,
    ColumnType::Date,
];

impl ColumnType {
    /// Inference preference. When several types match a column's
    /// sample, the highest priority wins.
    pub const fn priority(&self) -> u8 {
        match self {
            ColumnType::Integer => 4,
            ColumnType::Float => 3,
            ColumnType::Boolean => 2,
            ColumnType::Date => 1,
            ColumnType::Text => 0,
        }
    }

    /// A representative value of this type, for documentation and UI
    /// placeholders.
    pub fn example(&self) -> TypedValue {
        match self {
            ColumnType::Text => TypedValue::Text("foo".into()),
            ColumnType::Integer => TypedValue::Integer(1),
            ColumnType::Float => TypedValue::Float(3.14),
            ColumnType::Boolean => TypedValue::Boolean(false),
            ColumnType::Date => TypedValue::Date(
                NaiveDate::from_ymd_opt(2018, 1, 3).expect("valid example date"),
            ),
        }
    }

    /// The SQL type this column maps to on the storage side.
    pub const fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "bigint",
            ColumnType::Float => "double precision",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        }
    }

    /// Inverse of [`sql_type`](Self::sql_type). Accepts `integer` as
    /// well as `bigint` so schemas read back from older tables still
    /// resolve.
    pub fn from_sql_type(name: &str) -> Option<ColumnType> {
        match name {
            "text" => Some(ColumnType::Text),
            "bigint" | "integer" => Some(ColumnType::Integer),
            "double precision" => Some(ColumnType::Float),
            "boolean" => Some(ColumnType::Boolean),
            "date" => Some(ColumnType::Date),
            _ => None,
        }
    }

    /// The name this type goes by in the external API.
    pub const fn api_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
        }
    }

    /// Inverse of [`api_name`](Self::api_name).
    pub fn from_api_name(name: &str) -> Option<ColumnType> {
        match name {
            "string" => Some(ColumnType::Text),
            "integer" => Some(ColumnType::Integer),
            "float" => Some(ColumnType::Float),
            "boolean" => Some(ColumnType::Boolean),
            "date" => Some(ColumnType::Date),
            _ => None,
        }
    }

    /// Human-readable name, capitalized for UI display.
    pub const fn pretty_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "Text",
            ColumnType::Integer => "Integer",
            ColumnType::Float => "Float",
            ColumnType::Boolean => "Boolean",
            ColumnType::Date => "Date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty_name())
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Header name, exactly as it appeared in the file (or was assigned).
    pub name: String,
    /// The type every cell of this column converts to.
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Column {
            name: name.into(),
            column_type,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.column_type)
    }
}
