//! Tolerant parsing of locale-ambiguous numeric text.
//!
//! Guide sheets arrive with mixed decimal separators ("1.234,56", "12,5"),
//! stray `%` signs, ratio notation ("1:8") and free-text ages ("SEM 25").
//! Every function here fails soft: malformed input yields `None`, never an
//! error, so a single bad cell only drops its own derived value.

/// Parse a decimal from free-form text.
///
/// Whitespace and `%` signs are stripped. When both `.` and `,` appear, the
/// rightmost occurrence is the decimal point and the other character is a
/// thousands separator; a lone `,` is a decimal point.
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    let cleaned: String = raw.chars().filter(|c| *c != ' ' && *c != '%').collect();
    if cleaned.is_empty() {
        return None;
    }
    normalize_separators(&cleaned)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn normalize_separators(s: &str) -> String {
    match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                s.chars()
                    .filter(|&c| c != '.')
                    .map(|c| if c == ',' { '.' } else { c })
                    .collect()
            } else {
                s.chars().filter(|&c| c != ',').collect()
            }
        }
        (None, Some(_)) => s.replace(',', "."),
        _ => s.to_string(),
    }
}

/// Parse a percentage. Stored values are already scaled 0-100, so this is
/// `parse_number` without further division.
pub fn parse_percent(value: Option<&str>) -> Option<f64> {
    parse_number(value)
}

/// Parse a mating ratio into a percentage.
///
/// Three notations are accepted: plain percent ("12.5" or "12.5%"), fraction
/// (a value in (0, 1] is multiplied by 100), and ratio "A:B" (A/B x 100).
/// A bare value in (0, 1] is always read as a fraction, so a genuine
/// sub-1% rate written as "0.5" comes back as 50 - known limitation of the
/// heuristic.
pub fn parse_mating_percent(value: Option<&str>) -> Option<f64> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some((num, den)) = raw.split_once(':') {
        let a = parse_number(Some(num))?;
        let b = parse_number(Some(den))?;
        if b == 0.0 {
            return None;
        }
        return Some(a / b * 100.0);
    }
    let v = parse_number(Some(raw))?;
    if v > 0.0 && v <= 1.0 {
        Some(v * 100.0)
    } else {
        Some(v)
    }
}

/// Extract an age in weeks from numeric or free-form text.
///
/// Pure numeric strings round to the nearest integer (half away from zero);
/// otherwise the first digit run is taken ("SEM 25" -> 25). No digits ->
/// `None`.
pub fn parse_age(value: Option<&str>) -> Option<u32> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(v) = parse_number(Some(raw)) {
        if v < 0.0 {
            return None;
        }
        return Some(v.round() as u32);
    }
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }
    digits.parse::<u32>().ok()
}

/// Format a value the way guide sheets store decimals: two fraction digits,
/// comma decimal separator. Round-trips through `parse_number`.
pub fn format_number(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}
