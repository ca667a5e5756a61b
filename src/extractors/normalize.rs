// src/extractors/normalize.rs

/// Converts a report value cell into a float.
///
/// Accepts the notations seen across vendors:
/// - "R1,234.56" / "26 450.00" -> 1234.56 / 26450.0 (currency marker, separators, spaces)
/// - "(R12.00)" / "-R50.00" -> -12.0 / -50.0 (marker inside the sign)
/// - "26 %" -> 26.0 (percent is kept as a bare number)
/// - "123.45-" and "(123.45)" -> -123.45
/// - "", "-", ".00" -> 0.0
///
/// Anything that still fails to parse yields 0.0 so one bad cell never aborts a document.
pub fn normalize_amount(text: &str) -> f64 {
    // The currency marker may follow a sign or opening parenthesis, e.g. "(R12.00)"
    let mut cleaned: String = text
        .chars()
        .filter(|c| *c != 'R' && *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || cleaned == "-" || cleaned == ".00" {
        return 0.0;
    }

    if cleaned.ends_with('%') {
        cleaned.pop();
    }

    let parsed = if let Some(body) = cleaned.strip_suffix('-') {
        parse_finite(body).map(|v| -v)
    } else if let Some(body) = cleaned
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        parse_finite(body).map(|v| -v)
    } else {
        parse_finite(&cleaned)
    };

    parsed.unwrap_or_else(|| {
        tracing::trace!("Unparseable amount '{}' (cleaned '{}'), using 0.0", text, cleaned);
        0.0
    })
}

/// Converts a count cell into an integer by keeping only its digits.
///
/// "1,234 units" -> 1234. Empty or overflowing input yields 0.
pub fn normalize_int(text: &str) -> i64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<i64>().unwrap_or_else(|_| {
        tracing::trace!("Count '{}' does not fit an i64, using 0", text);
        0
    })
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
