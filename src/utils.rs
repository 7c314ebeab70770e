// Utility functions
use chrono::{DateTime, Local, TimeZone};
use chrono_tz::Tz;
use serde_json::Value;

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses a provider number that may arrive as text with surrounding whitespace.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts an epoch-milliseconds timestamp into the given timezone.
pub fn parse_epoch_millis(millis: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.with_timezone(tz))
}

/// Renders a bar timestamp as `YYYY-MM-DD HH:MM`.
pub fn format_bar_time<T: TimeZone>(timestamp: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// File name offered for saving an analysis, e.g. `XAUUSD_analysis_20250101_0930.txt`.
pub fn analysis_file_name(symbol: &str, now: &DateTime<Local>) -> String {
    format!("{}_analysis_{}.txt", symbol, now.format("%Y%m%d_%H%M"))
}

/// Reads a JSON scalar as text; providers mix quoted and bare numbers.
pub fn json_scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(4.126), 4.13);
        assert_eq!(round2(159_000.0), 159_000.0);
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn epoch_millis_convert_to_timezone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        // 2024-01-02T15:00:00Z
        let dt = parse_epoch_millis(1_704_207_600_000, &tz).unwrap();
        assert_eq!(format_bar_time(&dt), "2024-01-02 10:00");
    }

    #[test]
    fn file_name_uses_minute_precision() {
        let naive = NaiveDate::from_ymd_opt(2025, 3, 4)
            .unwrap()
            .and_hms_opt(9, 30, 59)
            .unwrap();
        let now = Local.from_local_datetime(&naive).unwrap();
        assert_eq!(analysis_file_name("XAUUSD", &now), "XAUUSD_analysis_20250304_0930.txt");
    }

    #[test]
    fn json_scalars_become_text() {
        assert_eq!(json_scalar_to_string(&serde_json::json!("1.5")), "1.5");
        assert_eq!(json_scalar_to_string(&serde_json::json!(2)), "2");
        assert_eq!(json_scalar_to_string(&Value::Null), "");
    }
}
