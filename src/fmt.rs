fn group_thousands(int_part: &str) -> String {
    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    with_commas.chars().rev().collect()
}

/// Format a number with thousands separators and at most two decimals:
/// 1234.5 -> "1,234.5", 10 -> "10".
pub fn number(val: f64) -> String {
    if !val.is_finite() {
        return val.to_string();
    }
    let rounded = format!("{:.2}", val.abs());
    let (int_part, dec_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let dec_part = dec_part.trim_end_matches('0');
    let negative = val < 0.0 && (int_part != "0" || !dec_part.is_empty());

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !dec_part.is_empty() {
        out.push('.');
        out.push_str(dec_part);
    }
    out
}

/// Integer count with thousands separators.
pub fn count(val: usize) -> String {
    group_thousands(&val.to_string())
}

pub fn percent(val: f64, decimals: usize) -> String {
    format!("{val:.decimals$}%")
}

/// Shorten a label to `max` characters plus "...".
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let head: String = label.chars().take(max).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

pub fn format_bytes(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{size} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
