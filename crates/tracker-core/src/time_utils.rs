use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::{Result, TrackerError};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Resolves "today" in the user's configured timezone.
pub struct TimezoneHandler {
    tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler for the given IANA timezone name.
    ///
    /// Unrecognised names fall back to UTC with a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "TimezoneHandler: unrecognised timezone \"{}\", falling back to UTC",
                tz_name
            );
            Tz::UTC
        });
        Self { tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// The current calendar date in this timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }
}

// ── Date input ────────────────────────────────────────────────────────────────

/// Formats accepted from the entry form, tried in order, with whether the
/// year leads the string.
const DATE_INPUT_FORMATS: &[(&str, bool)] = &[
    ("%Y-%m-%d", true),
    ("%d-%m-%Y", false),
    ("%d/%m/%Y", false),
    ("%d.%m.%Y", false),
];

/// Parse a user-typed date.
///
/// Accepts `YYYY-MM-DD`, `DD-MM-YYYY`, `DD/MM/YYYY` and `DD.MM.YYYY`.
/// Strings that match a format's shape but name a non-existent day
/// (`31-02-2024`) are rejected like any other malformed input, as are
/// years that are not written with exactly four digits (`15-01-24`).
pub fn parse_reading_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::validation("date is required"));
    }
    DATE_INPUT_FORMATS
        .iter()
        .filter(|(_, year_first)| has_four_digit_year(trimmed, *year_first))
        .find_map(|(fmt, _)| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| {
            TrackerError::validation(format!("\"{}\" is not a valid calendar date", trimmed))
        })
}

/// chrono's `%Y` takes any digit count, so the year field is checked here.
fn has_four_digit_year(input: &str, year_first: bool) -> bool {
    let mut parts = input.split(['-', '/', '.']);
    let year = if year_first {
        parts.next()
    } else {
        parts.last()
    };
    year.is_some_and(|y| y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()))
}

// ── Calendar helpers ──────────────────────────────────────────────────────────

/// Last day of the given month, or `None` for an out-of-range year/month.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Week of the month, 1-based: days 1-7 → 1, 8-14 → 2, …, 29-31 → 5.
pub fn week_of_month(date: NaiveDate) -> u32 {
    (date.day() - 1) / 7 + 1
}

/// First and last day of the week-of-month containing `date`, clamped to the
/// month.
pub fn week_of_month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = week_of_month(date);
    let first_day = (week - 1) * 7 + 1;
    let start = date.with_day(first_day).unwrap_or(date);
    let month_end = last_day_of_month(date.year(), date.month()).unwrap_or(date);
    let end = date
        .with_day(first_day + 6)
        .filter(|d| *d <= month_end)
        .unwrap_or(month_end);
    (start, end)
}

/// English month name for `month` in `1..=12`.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_reading_date_iso() {
        assert_eq!(parse_reading_date("2024-01-15").unwrap(), d(2024, 1, 15));
    }

    #[test]
    fn test_parse_reading_date_day_first_variants() {
        assert_eq!(parse_reading_date("15-01-2024").unwrap(), d(2024, 1, 15));
        assert_eq!(parse_reading_date("15/01/2024").unwrap(), d(2024, 1, 15));
        assert_eq!(parse_reading_date(" 15.01.2024 ").unwrap(), d(2024, 1, 15));
    }

    #[test]
    fn test_parse_reading_date_rejects_impossible_day() {
        assert!(parse_reading_date("31-02-2024").is_err());
        assert!(parse_reading_date("2023-02-29").is_err());
    }

    #[test]
    fn test_parse_reading_date_rejects_garbage() {
        assert!(parse_reading_date("").is_err());
        assert!(parse_reading_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_reading_date_requires_four_digit_year() {
        assert!(parse_reading_date("15-01-24").is_err());
        assert!(parse_reading_date("15/01/24").is_err());
        assert!(parse_reading_date("24-01-15").is_err());
        assert!(parse_reading_date("15-01-02024").is_err());
        assert_eq!(parse_reading_date("15-01-2024").unwrap(), d(2024, 1, 15));
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2024, 2), Some(d(2024, 2, 29)));
        assert_eq!(last_day_of_month(2023, 2), Some(d(2023, 2, 28)));
        assert_eq!(last_day_of_month(2024, 12), Some(d(2024, 12, 31)));
        assert_eq!(last_day_of_month(2024, 13), None);
    }

    #[test]
    fn test_week_of_month() {
        assert_eq!(week_of_month(d(2024, 1, 1)), 1);
        assert_eq!(week_of_month(d(2024, 1, 7)), 1);
        assert_eq!(week_of_month(d(2024, 1, 8)), 2);
        assert_eq!(week_of_month(d(2024, 1, 29)), 5);
    }

    #[test]
    fn test_week_of_month_bounds_clamped() {
        assert_eq!(
            week_of_month_bounds(d(2024, 2, 29)),
            (d(2024, 2, 29), d(2024, 2, 29))
        );
        assert_eq!(
            week_of_month_bounds(d(2024, 1, 10)),
            (d(2024, 1, 8), d(2024, 1, 14))
        );
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
    }

    #[test]
    fn test_timezone_handler_invalid_falls_back() {
        let handler = TimezoneHandler::new("Mars/Olympus");
        assert_eq!(handler.tz(), Tz::UTC);
        assert!(TimezoneHandler::validate_timezone("Asia/Kolkata"));
        assert!(!TimezoneHandler::validate_timezone("Mars/Olympus"));
    }
}
