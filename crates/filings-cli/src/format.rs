//! Number formatting for terminal output.

const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// `1234.5` as `$1,234.50`.
pub(crate) fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("${sign}{}.{cents}", group_thousands(whole))
}

/// `0.1234` as `12.34%`.
pub(crate) fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// `1_500_000` as `1.5M`.
pub(crate) fn format_large_number(value: f64) -> String {
    let mut value = value;
    let mut suffix = 0;
    while value >= 1000.0 && suffix < SUFFIXES.len() - 1 {
        value /= 1000.0;
        suffix += 1;
    }
    format!("{value:.1}{}", SUFFIXES[suffix])
}
