//! Exact-decimal number handling.
//!
//! G-code numeric tokens must not drift through binary floating point: `X1.20`
//! and `X1.2` are the same position but printing the former as `1.2` would
//! silently discard precision the source author chose to write. [`ExactNum`]
//! keeps the value as both an `f64` (for arithmetic and geometry) and a
//! normalized textual form (for equality, hashing, and round-tripping).

use std::fmt;

/// A signed decimal number as it appears in a single G-code word, e.g. the
/// `-12.500` in `Z-12.500`.
#[derive(Debug, Clone)]
pub struct ExactNum {
    /// Normalized textual form: no leading zeros in the integer part (besides
    /// a bare `0`), no trailing zeros in the fractional part, no `+` sign, no
    /// `-0`.
    text: String,
    value: f64,
}

impl ExactNum {
    /// Parses a signed decimal literal (e.g. `"5"`, `"-0.5"`, `"+3.140"`).
    /// Returns `None` if `s` is not a valid decimal tail per the lexer's word
    /// grammar (`[+-]?\d*\.?\d*`, at least one digit somewhere).
    pub fn parse(s: &str) -> Option<Self> {
        let value = s.parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self {
            text: normalize(s)?,
            value,
        })
    }

    /// Builds an `ExactNum` directly from a computed `f64`, formatting it with
    /// `decimal_places` digits after the point and then normalizing (stripping
    /// trailing zeros) so it compares equal to any equivalent literal form.
    pub fn from_f64(value: f64, decimal_places: u32) -> Self {
        let formatted = format!("{:.prec$}", value, prec = decimal_places as usize);
        // `format!` with fixed precision on a finite f64 always yields a
        // normalizable decimal literal.
        let text = normalize(&formatted).unwrap_or(formatted);
        Self {
            value: text.parse::<f64>().unwrap_or(value),
            text,
        }
    }

    /// The normalized textual form, suitable for direct concatenation after a
    /// code letter (e.g. `format!("X{}", n.text())`).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The value as `f64`, for arithmetic and geometry. Never used for
    /// equality comparisons between tokens.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Count of significant digits after the decimal point in the normalized
    /// form (0 if there is no fractional part).
    pub fn decimal_places(&self) -> usize {
        match self.text.split_once('.') {
            Some((_, frac)) => frac.len(),
            None => 0,
        }
    }

    /// Returns a copy rounded to `places` decimal digits.
    pub fn rounded(&self, places: u32) -> Self {
        Self::from_f64(self.value, places)
    }
}

impl PartialEq for ExactNum {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}
impl Eq for ExactNum {}

impl std::hash::Hash for ExactNum {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for ExactNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Normalizes a signed decimal literal: drops a leading `+`, strips leading
/// zeros from the integer part (keeping a bare `0`), strips trailing zeros
/// from the fractional part (dropping the point if nothing remains), and
/// collapses `-0` to `0`.
fn normalize(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (neg, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, f),
        None => (rest, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let int_stripped = int_part.trim_start_matches('0');
    let int_norm = if int_stripped.is_empty() {
        "0"
    } else {
        int_stripped
    };
    let frac_norm = frac_part.trim_end_matches('0');

    let is_zero = int_norm == "0" && frac_norm.is_empty();
    let sign = if neg && !is_zero { "-" } else { "" };

    Some(if frac_norm.is_empty() {
        format!("{sign}{int_norm}")
    } else {
        format!("{sign}{int_norm}.{frac_norm}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integer() {
        assert_eq!(ExactNum::parse("5").unwrap().text(), "5");
    }

    #[test]
    fn parses_negative_decimal() {
        assert_eq!(ExactNum::parse("-12.500").unwrap().text(), "-12.5");
    }

    #[test]
    fn strips_leading_plus() {
        assert_eq!(ExactNum::parse("+3.14").unwrap().text(), "3.14");
    }

    #[test]
    fn strips_leading_zeros() {
        assert_eq!(ExactNum::parse("007").unwrap().text(), "7");
    }

    #[test]
    fn collapses_negative_zero() {
        assert_eq!(ExactNum::parse("-0.000").unwrap().text(), "0");
        assert_eq!(ExactNum::parse("-0").unwrap().text(), "0");
    }

    #[test]
    fn leading_dot_only_fraction() {
        assert_eq!(ExactNum::parse(".5").unwrap().text(), "0.5");
    }

    #[test]
    fn trailing_dot_only_integer() {
        assert_eq!(ExactNum::parse("5.").unwrap().text(), "5");
    }

    #[test]
    fn equality_ignores_textual_form_differences() {
        assert_eq!(ExactNum::parse("5.0").unwrap(), ExactNum::parse("5").unwrap());
        assert_eq!(ExactNum::parse("05.10").unwrap(), ExactNum::parse("5.1").unwrap());
    }

    #[test]
    fn inequality_for_different_values() {
        assert_ne!(ExactNum::parse("5").unwrap(), ExactNum::parse("5.01").unwrap());
    }

    #[test]
    fn decimal_places_counts_fractional_digits() {
        assert_eq!(ExactNum::parse("5").unwrap().decimal_places(), 0);
        assert_eq!(ExactNum::parse("5.120").unwrap().decimal_places(), 2);
    }

    #[test]
    fn from_f64_round_trips_with_precision() {
        let n = ExactNum::from_f64(1.0 / 3.0, 4);
        assert_eq!(n.text(), "0.3333");
    }

    #[test]
    fn from_f64_strips_trailing_zeros() {
        let n = ExactNum::from_f64(2.0, 3);
        assert_eq!(n.text(), "2");
    }

    #[test]
    fn rounded_reduces_precision() {
        let n = ExactNum::parse("1.23456").unwrap();
        assert_eq!(n.rounded(2).text(), "1.23");
    }

    #[test]
    fn rounding_is_idempotent() {
        let n = ExactNum::parse("1.23456").unwrap();
        let once = n.rounded(3);
        let twice = once.rounded(3);
        assert_eq!(once, twice);
    }

    #[test]
    fn invalid_literal_rejected() {
        assert!(ExactNum::parse("abc").is_none());
        assert!(ExactNum::parse("").is_none());
        assert!(ExactNum::parse("--5").is_none());
    }
}
