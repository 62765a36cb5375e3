/// Shared utility functions for the stream gauge service
use chrono::NaiveDate;
use std::path::Path;

/// File extensions calamine can open as workbooks
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Derive a site code from a sheet name
///
/// Crews name each tab with the site code first, e.g. "CC1 2024-01-15" or
/// "SLO3 morning visit". The first whitespace-delimited token is the code.
///
/// # Examples
///
/// ```
/// use stream_gauge_service::utils::site_code_from_sheet_name;
///
/// assert_eq!(site_code_from_sheet_name("CC1 2024-01-15").unwrap(), "CC1");
/// assert_eq!(site_code_from_sheet_name("  SLO3   visit").unwrap(), "SLO3");
/// assert!(site_code_from_sheet_name("   ").is_none());
/// ```
pub fn site_code_from_sheet_name(sheet_name: &str) -> Option<String> {
    sheet_name.split_whitespace().next().map(|s| s.to_string())
}

/// Canonical `YYYY/MM/DD` label used for grouping and filtering by date
pub fn date_label(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Parse a `YYYY/MM/DD` label back into a date
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(label.trim(), "%Y/%m/%d").ok()
}

/// Round to two decimal places for display, halves to even
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Whether the path's extension marks it as a spreadsheet (case-insensitive)
pub fn is_spreadsheet_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Split a comma separated query value into trimmed, non-empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
