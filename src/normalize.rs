// Holder name normalization
// Holder strings arrive with store-code prefixes ("12A-강남점") that must be
// stripped before the gazetteer sees them.

/// Substring that marks the internal office holder.
pub const OFFICE_MARKER: &str = "반추";

/// Canonical display name for the internal office.
pub const OFFICE_CANONICAL: &str = "반추정보통신";

/// Check whether a holder string denotes the internal office.
pub fn is_office(text: &str) -> bool {
    text.contains(OFFICE_MARKER)
}

/// Normalize a raw holder string into its canonical display name.
///
/// Strips a leading store-code prefix: a run of non-whitespace, non-hyphen
/// characters containing at least one digit, immediately followed by a
/// hyphen (`"12A-강남점"` → `"강남점"`). Inputs without such a prefix are
/// returned trimmed and unchanged.
///
/// Any input containing the office marker collapses to the office canonical
/// name regardless of surrounding noise. Total: never fails, empty in gives
/// empty out.
pub fn normalize_holder(raw: &str) -> String {
    let trimmed = raw.trim();

    if is_office(trimmed) {
        return OFFICE_CANONICAL.to_string();
    }

    match strip_code_prefix(trimmed) {
        Some(rest) => rest.to_string(),
        None => trimmed.to_string(),
    }
}

/// Find a `<code containing a digit>-` prefix and return the remainder.
///
/// Equivalent to stripping the pattern `^[^-\s]*\d[^-\s]*-`: the run before
/// the first hyphen may contain no whitespace and must contain a digit.
fn strip_code_prefix(text: &str) -> Option<&str> {
    let mut saw_digit = false;

    for (i, c) in text.char_indices() {
        if c == '-' {
            return if saw_digit {
                Some(&text[i + 1..])
            } else {
                None
            };
        }
        if c.is_whitespace() {
            return None;
        }
        if c.is_numeric() {
            saw_digit = true;
        }
    }

    None
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_digit_code_prefix() {
        assert_eq!(normalize_holder("12A-강남점"), "강남점");
        assert_eq!(normalize_holder("55B-강남점"), "강남점");
        assert_eq!(normalize_holder("3-수원모바일"), "수원모바일");
    }

    #[test]
    fn test_no_prefix_returns_trimmed_input() {
        assert_eq!(normalize_holder("강남점"), "강남점");
        assert_eq!(normalize_holder("  강남점  "), "강남점");
    }

    #[test]
    fn test_hyphen_without_digit_is_kept() {
        // "도매-" style prefixes carry no digit and survive normalization
        assert_eq!(normalize_holder("도매-일산"), "도매-일산");
    }

    #[test]
    fn test_whitespace_before_hyphen_blocks_stripping() {
        assert_eq!(normalize_holder("매장 12-강남"), "매장 12-강남");
    }

    #[test]
    fn test_office_collapses_to_canonical_name() {
        assert_eq!(normalize_holder("반추"), OFFICE_CANONICAL);
        assert_eq!(normalize_holder("Office-HQ(반추)"), OFFICE_CANONICAL);
        assert_eq!(normalize_holder("99Z-반추정보통신"), OFFICE_CANONICAL);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize_holder(""), "");
        assert_eq!(normalize_holder("   "), "");
    }
}
