//! Blank-tolerant sample matching, shared by every sniffer.

use regex::Regex;

use super::patterns::WHITESPACE_PATTERN;

/// Returns true when at least one value matches `pattern` and every
/// value that does not match is blank (empty or spaces only).
///
/// Blanks are never positive evidence: an all-blank sample returns
/// false, so a column of empty cells falls through to text.
pub fn matches_with_blanks<'a, I>(pattern: &Regex, values: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matched_one = false;
    for value in values {
        if pattern.is_match(value) {
            matched_one = true;
        } else if !WHITESPACE_PATTERN.is_match(value) {
            return false;
        }
    }
    matched_one
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conv::patterns::INTEGER_PATTERN;

    #[test]
    fn test_all_matching() {
        assert!(matches_with_blanks(&INTEGER_PATTERN, ["1", "2", "3"]));
    }

    #[test]
    fn test_blanks_are_ignored() {
        assert!(matches_with_blanks(&INTEGER_PATTERN, ["1", "", "  ", "3"]));
    }

    #[test]
    fn test_one_stray_value_disqualifies() {
        assert!(!matches_with_blanks(&INTEGER_PATTERN, ["1", "2", "x"]));
    }

    #[test]
    fn test_all_blank_is_not_a_match() {
        assert!(!matches_with_blanks(&INTEGER_PATTERN, ["", "   ", ""]));
        assert!(!matches_with_blanks(&INTEGER_PATTERN, []));
    }

    #[test]
    fn test_tabs_are_not_blank() {
        // Only spaces count as blank for sniffing purposes.
        assert!(!matches_with_blanks(&INTEGER_PATTERN, ["1", "\t"]));
    }
}
