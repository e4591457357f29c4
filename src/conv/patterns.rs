//! Compiled sniffing patterns for the supported column types.
//!
//! Each pattern is a superset of what the matching converter will
//! actually parse: sniffing answers "could this column plausibly be
//! X", conversion has the final word.

use regex::Regex;

/// Pattern for blank cells: empty, or spaces only.
pub static WHITESPACE_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^ *$").expect("Invalid whitespace pattern"));

/// Pattern for integers, tolerating comma and space digit grouping
/// (`1`, `-2`, `1,234`, `1 234`).
pub static INTEGER_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^ ?-?[0-9, ]+$").expect("Invalid integer pattern"));

/// Pattern for floats, tolerating comma grouping (`3.14`, `-1,000.5`).
pub static FLOAT_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"^ ?-?[0-9,. ]+$").expect("Invalid float pattern"));

/// Pattern for booleans in their common spellings, any casing.
pub static BOOLEAN_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)^ ?(TRUE|FALSE|T|F|YES|NO|Y|N) ?$").expect("Invalid boolean pattern")
});

/// Truthy boolean spellings, matched against an already-trimmed cell.
pub static TRUE_PATTERN: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)^(TRUE|T|YES|Y)$").expect("Invalid true pattern"));

/// Falsy boolean spellings, matched against an already-trimmed cell.
pub static FALSE_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?i)^(FALSE|F|NO|N)$").expect("Invalid false pattern")
});

/// Pattern for ISO-8601 calendar dates (`2018-01-03`).
pub static DATE_PATTERN: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^ ?[0-9]{4}-[0-9]{2}-[0-9]{2} ?$").expect("Invalid date pattern")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_pattern() {
        assert!(WHITESPACE_PATTERN.is_match(""));
        assert!(WHITESPACE_PATTERN.is_match("   "));
        assert!(!WHITESPACE_PATTERN.is_match("\t"));
        assert!(!WHITESPACE_PATTERN.is_match(" x "));
    }

    #[test]
    fn test_integer_pattern() {
        assert!(INTEGER_PATTERN.is_match("123"));
        assert!(INTEGER_PATTERN.is_match("-123"));
        assert!(INTEGER_PATTERN.is_match("1,234,567"));
        assert!(INTEGER_PATTERN.is_match(" 42"));
        assert!(!INTEGER_PATTERN.is_match("12.5"));
        assert!(!INTEGER_PATTERN.is_match("abc"));
        assert!(!INTEGER_PATTERN.is_match(""));
    }

    #[test]
    fn test_float_pattern() {
        assert!(FLOAT_PATTERN.is_match("3.14"));
        assert!(FLOAT_PATTERN.is_match("-1,000.5"));
        assert!(FLOAT_PATTERN.is_match("123"));
        assert!(!FLOAT_PATTERN.is_match("1e10"));
        assert!(!FLOAT_PATTERN.is_match("nan"));
    }

    #[test]
    fn test_boolean_patterns() {
        assert!(BOOLEAN_PATTERN.is_match("TRUE"));
        assert!(BOOLEAN_PATTERN.is_match("false"));
        assert!(BOOLEAN_PATTERN.is_match("Y"));
        assert!(BOOLEAN_PATTERN.is_match(" no "));
        assert!(!BOOLEAN_PATTERN.is_match("yess"));
        assert!(!BOOLEAN_PATTERN.is_match("0"));
        assert!(TRUE_PATTERN.is_match("yes"));
        assert!(!TRUE_PATTERN.is_match("no"));
        assert!(FALSE_PATTERN.is_match("F"));
        assert!(!FALSE_PATTERN.is_match("T"));
    }

    #[test]
    fn test_date_pattern() {
        assert!(DATE_PATTERN.is_match("2018-01-03"));
        assert!(DATE_PATTERN.is_match(" 2018-01-03 "));
        assert!(!DATE_PATTERN.is_match("2018-1-3"));
        assert!(!DATE_PATTERN.is_match("03/01/2018"));
        assert!(!DATE_PATTERN.is_match("2018-01-03T00:00:00"));
    }
}
