// Utility helpers for numeric coercion, French number formatting and
// markup escaping.
//
// Every text value that reaches a number goes through `to_num`, and every
// number that reaches a page goes through `format_int`/`format_decimal`, so
// the rest of the code can work with plain `f64`.
use num_format::{Locale, ToFormattedString};

/// Convert a CSV field to `f64`, accepting a decimal comma.
///
/// Lenient on purpose: empty, missing, non-numeric and non-finite values
/// (`"NaN"`, `"inf"`) all become `0.0` instead of an error, so a dirty cell
/// only contributes nothing to the totals.
pub fn to_num(s: Option<&str>) -> f64 {
    let Some(s) = s else {
        return 0.0;
    };
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s.replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn group_thousands(n: i64) -> String {
    // `num-format` uses a (narrow) no-break space for French; pages and
    // console output both want a plain space.
    n.to_formatted_string(&Locale::fr)
        .replace(['\u{202f}', '\u{a0}'], " ")
}

/// Round to the nearest integer and group thousands: `12345.6` -> `12 346`.
pub fn format_int(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    group_thousands(n.round() as i64)
}

/// Fixed decimals with a comma marker and grouped integer part:
/// `1234.5` with 2 decimals -> `1 234,50`.
pub fn format_decimal(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return format_decimal(0.0, decimals);
    }
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part: i64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut res = group_thousands(int_part);
    if let Some(frac) = parts.next() {
        res.push(',');
        res.push_str(frac);
    }
    // Avoid "-0,00" for tiny negatives that round to zero.
    let is_zero = s.chars().all(|c| c == '0' || c == '.');
    if n.is_sign_negative() && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

/// Escape the five reserved markup characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `value / population * 10 000`, or 0 when there is no population.
pub fn rate_per_10k(value: f64, population: f64) -> f64 {
    if population > 0.0 {
        value / population * 10_000.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_num_accepts_decimal_comma() {
        assert_eq!(to_num(Some("12,5")), 12.5);
        assert_eq!(to_num(Some(" 3 ")), 3.0);
    }

    #[test]
    fn to_num_is_lenient() {
        assert_eq!(to_num(None), 0.0);
        assert_eq!(to_num(Some("")), 0.0);
        assert_eq!(to_num(Some("n/a")), 0.0);
        assert_eq!(to_num(Some("NaN")), 0.0);
        assert_eq!(to_num(Some("inf")), 0.0);
    }

    #[test]
    fn formats_french_numbers() {
        assert_eq!(format_int(1234567.0), "1 234 567");
        assert_eq!(format_int(7.6), "8");
        assert_eq!(format_decimal(53.3333, 2), "53,33");
        assert_eq!(format_decimal(1234.5, 2), "1 234,50");
        assert_eq!(format_decimal(-2.5, 1), "-2,5");
        assert_eq!(format_decimal(-0.001, 2), "0,00");
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">O'Neil & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#39;Neil &amp; co&lt;/a&gt;"
        );
    }

    #[test]
    fn rate_is_zero_without_population() {
        assert_eq!(rate_per_10k(120.0, 30000.0), 40.0);
        assert_eq!(rate_per_10k(5.0, 0.0), 0.0);
        assert_eq!(rate_per_10k(5.0, -3.0), 0.0);
    }
}
