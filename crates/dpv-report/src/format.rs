/// Formats a statistic with four decimals, without trailing zeros.
///
/// ```
/// use dpv_report::format_number;
///
/// assert_eq!(format_number(2.5), "2.5");
/// assert_eq!(format_number(10.0), "10");
/// assert_eq!(format_number(1.234567), "1.2346");
/// ```
pub fn format_number(value: f64) -> String {
    let s = format!("{value:.4}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
