/// Largest integer magnitude an `f64` represents exactly (2^53).
const MAX_EXACT_INTEGER: &str = "9007199254740992";

/// Parse a well-formed numeric string.
///
/// Accepted grammar, after trimming surrounding whitespace:
/// `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`.
/// Hex, `Infinity`, `NaN` and the empty string are rejected, as is
/// anything that overflows to infinity.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if !is_well_formed(text.as_bytes()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_well_formed(bytes: &[u8]) -> bool {
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;

    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        frac_digits = count_digits(&bytes[i..]);
        i += frac_digits;
    }
    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(&bytes[i..]);
        if exp_digits == 0 {
            return false;
        }
        i += exp_digits;
    }

    i == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// True when `raw` is written as a plain integer that `parsed`, the `f64`
/// read from it, does not equal exactly.
///
/// Integers up to 2^53 are always exact; larger ones are exact only when
/// they land on a representable value, e.g. `100000000000000000000`.
pub fn loses_integer_precision(raw: &str, parsed: f64) -> bool {
    let text = raw.trim();
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let significant = digits.trim_start_matches('0');
    if significant.len() < MAX_EXACT_INTEGER.len()
        || (significant.len() == MAX_EXACT_INTEGER.len() && significant <= MAX_EXACT_INTEGER)
    {
        return false;
    }
    format!("{:.0}", parsed.abs()) != significant
}

/// Render a number the way it would be typed back into an edit buffer.
///
/// Integral values below 1e21 print every digit of the stored value, so
/// parsing the text back yields the same `f64`; larger magnitudes use
/// exponent notation.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 {
        format!("{n:e}")
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_numbers() {
        assert_eq!(parse_numeric("42"), Some(42.0));
        assert_eq!(parse_numeric("-3.5"), Some(-3.5));
        assert_eq!(parse_numeric("+.25"), Some(0.25));
        assert_eq!(parse_numeric("7."), Some(7.0));
        assert_eq!(parse_numeric("1e3"), Some(1000.0));
        assert_eq!(parse_numeric("  12  "), Some(12.0));
        assert_eq!(parse_numeric("2.5E-1"), Some(0.25));
    }

    #[test]
    fn rejects_malformed_numbers() {
        for raw in ["", " ", "abc", "1.2.3", "1e", "--1", ".", "0x10", "NaN", "Infinity", "1 2", "1e999"] {
            assert_eq!(parse_numeric(raw), None, "{raw:?} should be rejected");
        }
    }

    #[test]
    fn big_integers_parse_imprecisely() {
        let lossy = |raw: &str| loses_integer_precision(raw, parse_numeric(raw).unwrap());

        assert_eq!(parse_numeric("1230000000000000000000000"), Some(1.23e24));
        assert!(lossy("1230000000000000000000000"));
        assert!(lossy("-9007199254740993"));
        assert!(lossy("1152921504606847000"));
        assert!(!lossy("9007199254740992"));
        assert!(!lossy("9007199254740994"));
        assert!(!lossy("-100000000000000000000"));
        assert!(!lossy("0001152921504606846976"));
        assert!(!lossy("1.5e30"));
    }

    #[test]
    fn formatted_numbers_parse_back_exactly() {
        for n in [1e20, 9007199254740994.0, 2f64.powi(60), -2f64.powi(70), 1e300, 0.1, 123.25] {
            let text = format_number(n);
            let parsed = parse_numeric(&text).unwrap();
            assert_eq!(parsed, n, "{text}");
            assert!(!loses_integer_precision(&text, parsed), "{text}");
        }
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(2f64.powi(60)), "1152921504606846976");
        assert_eq!(format_number(1e300), "1e300");
        assert_eq!(format_number(-1.5e21), "-1.5e21");
    }

    #[test]
    fn formats_like_an_edit_buffer() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }
}
