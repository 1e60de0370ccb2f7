//! Amount text validation.
//!
//! Two checks live here. [`accepts_partial_amount`] is the typing filter a
//! text field applies on every keystroke, so it accepts incomplete input such
//! as `""` or `"12."`. [`parse_amount`] runs on submit and is the real
//! boundary: the engine never relies on the filter having run.

use converter_types::AmountIssue;

/// Whether `text` may appear in the amount field while typing.
///
/// Accepts ASCII digits with at most one decimal point, including the empty string.
pub fn accepts_partial_amount(text: &str) -> bool {
    let mut seen_point = false;
    text.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

/// Parses a submitted amount into a strictly positive finite value.
pub fn parse_amount(text: &str) -> Result<f64, AmountIssue> {
    if text.trim().is_empty() {
        return Err(AmountIssue::Empty);
    }
    if !accepts_partial_amount(text) || !text.bytes().any(|b| b.is_ascii_digit()) {
        return Err(AmountIssue::Malformed);
    }

    let value: f64 = text.parse().map_err(|_| AmountIssue::Malformed)?;
    if !value.is_finite() {
        return Err(AmountIssue::NotFinite);
    }
    if value <= 0.0 {
        return Err(AmountIssue::NotPositive);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_partial_input() {
        for text in ["", ".", "12", "12.", ".5", "0.25", "007"] {
            assert!(accepts_partial_amount(text), "{text:?} should pass");
        }
    }

    #[test]
    fn test_filter_rejects_other_characters() {
        for text in ["1.2.3", "-5", "1e3", "12a", " 1", "1,5", "+1"] {
            assert!(!accepts_partial_amount(text), "{text:?} should fail");
        }
    }

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(parse_amount("100"), Ok(100.0));
        assert_eq!(parse_amount("12.5"), Ok(12.5));
        assert_eq!(parse_amount("12."), Ok(12.0));
        assert_eq!(parse_amount(".5"), Ok(0.5));
    }

    #[test]
    fn test_parse_empty_and_blank() {
        assert_eq!(parse_amount(""), Err(AmountIssue::Empty));
        assert_eq!(parse_amount("   "), Err(AmountIssue::Empty));
    }

    #[test]
    fn test_parse_malformed() {
        for text in [".", "abc", "1.2.3", "-5", "1e3", "NaN", "inf", " 5"] {
            assert_eq!(parse_amount(text), Err(AmountIssue::Malformed), "{text:?}");
        }
    }

    #[test]
    fn test_parse_zero_rejected() {
        assert_eq!(parse_amount("0"), Err(AmountIssue::NotPositive));
        assert_eq!(parse_amount("0.000"), Err(AmountIssue::NotPositive));
    }

    #[test]
    fn test_parse_overflow_rejected() {
        let huge = "9".repeat(400);
        assert_eq!(parse_amount(&huge), Err(AmountIssue::NotFinite));
    }
}
