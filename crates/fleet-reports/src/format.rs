//! Display formatting for KPI cards and expense legends

/// Format a number with thousands separators and at most three fraction
/// digits, trailing zeros trimmed ("1,234.5", "2.67", "-12")
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.3}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.insert(0, ',');
        }
        grouped.insert(0, c);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Dollar amount as shown on the dashboard ("$ 1,234.5")
pub fn format_currency(value: f64) -> String {
    format!("$ {}", format_number(value))
}

/// Signed percentage change ("+12%", "-3%", "0%")
pub fn format_change(percent: i64) -> String {
    if percent > 0 {
        format!("+{}%", percent)
    } else {
        format!("{}%", percent)
    }
}

/// Share of a total with one decimal ("42.5%")
pub fn format_share(percent: f64) -> String {
    format!("{:.1}%", percent)
}
