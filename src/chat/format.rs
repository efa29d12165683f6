use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Format a VND amount with thousand separators and no decimals.
/// e.g. `1234567` → `"1,234,567 VND"`
pub(crate) fn format_vnd(val: Decimal) -> String {
    let rounded = val.round();
    let digits = rounded.abs().to_string();

    let with_commas: String = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if rounded < Decimal::ZERO {
        format!("-{with_commas} VND")
    } else {
        format!("{with_commas} VND")
    }
}

/// Compact history form of a stored "YYYY-MM-DD HH:MM:SS" timestamp,
/// rendered as "DD/MM HH:MM". Falls back to the raw string if it does
/// not parse.
pub(crate) fn format_short_date(date: &str) -> String {
    match NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S") {
        Ok(dt) => dt.format("%d/%m %H:%M").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Text progress bar for budget usage, e.g. `[████░░░░░░]`.
pub(crate) fn progress_bar(ratio: f64, width: usize) -> String {
    let clamped = ratio.clamp(0.0, 1.0);
    let filled = (clamped * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
