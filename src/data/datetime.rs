use chrono::{DateTime, Datelike, NaiveDateTime};

/// Input format of the `Timestamp` column, e.g. `31/01/23 14:05`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%y %H:%M";

/// Format used when timestamps are written back out (CSV export, reports).
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Two-digit years from here up map to the 1900s: `69`..`99` become
/// 1969..1999 and `00`..`68` become 2000..2068.
const CENTURY_PIVOT: i32 = 2069;

/// Format of x-axis tick labels.
const AXIS_LABEL_FORMAT: &str = "%d/%m %H:%M";

/// Parse a `Timestamp` cell. Surrounding whitespace is ignored.
/// Returns `None` for anything that does not match `TIMESTAMP_FORMAT` exactly.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let ts = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT).ok()?;
    if ts.year() >= CENTURY_PIVOT {
        ts.with_year(ts.year() - 100)
    } else {
        Some(ts)
    }
}

/// Seconds since the Unix epoch, treating the naive timestamp as UTC.
/// This is the x coordinate used by the chart renderer.
pub fn to_axis_value(ts: NaiveDateTime) -> f64 {
    ts.and_utc().timestamp() as f64
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}

/// Tick label for an x coordinate produced by `to_axis_value`.
pub fn format_axis_label(axis_value: f64) -> String {
    DateTime::from_timestamp(axis_value.round() as i64, 0)
        .map(|dt| dt.format(AXIS_LABEL_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_day_first_two_digit_year() {
        let ts = parse_timestamp("31/01/23 14:05").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2023, 1, 31));
        assert_eq!((ts.hour(), ts.minute()), (14, 5));
    }

    #[test]
    fn two_digit_years_pivot_at_69() {
        assert_eq!(parse_timestamp("01/01/69 00:00").unwrap().year(), 1969);
        assert_eq!(parse_timestamp("31/12/99 23:59").unwrap().year(), 1999);
        assert_eq!(parse_timestamp("01/01/68 00:00").unwrap().year(), 2068);
        assert_eq!(parse_timestamp("01/01/00 00:00").unwrap().year(), 2000);
    }

    #[test]
    fn trims_whitespace() {
        assert!(parse_timestamp("  01/02/24 00:00 ").is_some());
    }

    #[test]
    fn rejects_other_formats() {
        assert!(parse_timestamp("2023-01-31 14:05").is_none());
        assert!(parse_timestamp("31/01/2023 14:05:00").is_none());
        assert!(parse_timestamp("32/01/23 14:05").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn formats_for_display() {
        let ts = parse_timestamp("05/06/21 07:08").unwrap();
        assert_eq!(format_timestamp(ts), "2021-06-05 07:08:00");
    }

    #[test]
    fn axis_value_is_monotonic() {
        let a = parse_timestamp("01/01/23 00:00").unwrap();
        let b = parse_timestamp("01/01/23 00:01").unwrap();
        assert_eq!(to_axis_value(b) - to_axis_value(a), 60.0);
    }

    #[test]
    fn axis_labels_show_day_month_and_time() {
        let ts = parse_timestamp("05/06/21 07:08").unwrap();
        assert_eq!(format_axis_label(to_axis_value(ts)), "05/06 07:08");
    }
}
