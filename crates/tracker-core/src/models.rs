use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// A single cumulative meter value taken on a calendar date.
///
/// Deserialization goes through [`Reading::new`], so a stored log with an
/// invalid value fails to load instead of producing a bad reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReading")]
pub struct Reading {
    /// Day the meter was read.
    pub date: NaiveDate,
    /// Cumulative meter value in units (kWh).
    pub value: f64,
}

impl Reading {
    /// Build a reading, rejecting negative and non-finite values.
    pub fn new(date: NaiveDate, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(TrackerError::validation(
                "reading must be a finite number",
            ));
        }
        if value < 0.0 {
            return Err(TrackerError::validation("reading cannot be negative"));
        }
        Ok(Self { date, value })
    }
}

#[derive(Deserialize)]
struct RawReading {
    date: NaiveDate,
    value: f64,
}

impl TryFrom<RawReading> for Reading {
    type Error = TrackerError;

    fn try_from(raw: RawReading) -> Result<Self> {
        Reading::new(raw.date, raw.value)
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// An inclusive `[start, end]` span of calendar dates.
///
/// Fields are private so that an inverted range can never be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Fails with a validation error when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TrackerError::validation(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// January 1st through December 31st of `year`.
    pub fn for_year(year: i32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)?;
        Some(Self { start, end })
    }

    /// The whole calendar month containing `date`.
    pub fn for_month_of(date: NaiveDate) -> Self {
        let start = date.with_day(1).unwrap_or(date);
        let end = crate::time_utils::last_day_of_month(date.year(), date.month()).unwrap_or(date);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ── Granularity ───────────────────────────────────────────────────────────────

/// Period size used when grouping consumption into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    /// Week of the month: days 1-7 are the 1st week, 8-14 the 2nd, etc.
    Week,
    Month,
    Year,
    /// One bucket covering exactly the given range.
    Custom(DateRange),
}

impl Granularity {
    /// Short display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
            Self::Month => "Monthly",
            Self::Year => "Yearly",
            Self::Custom(_) => "Custom Range",
        }
    }
}

// ── Consumption ───────────────────────────────────────────────────────────────

/// Non-fatal anomaly attached to a consumption entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeltaWarning {
    /// The meter went backwards: rollover, replacement, or a typo.
    NegativeDelta { delta: f64 },
}

impl DeltaWarning {
    pub fn message(&self) -> String {
        match self {
            Self::NegativeDelta { delta } => format!(
                "meter reading decreased by {:.2} units (rollover or entry error?)",
                delta.abs()
            ),
        }
    }
}

/// Units consumed between a reading and the one before it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumptionEntry {
    /// Date of the later reading; the delta is attributed to this day.
    pub date: NaiveDate,
    pub previous_value: f64,
    pub value: f64,
    /// `value - previous_value`, never clamped.
    pub delta_units: f64,
    pub warning: Option<DeltaWarning>,
}

// ── Bucket ────────────────────────────────────────────────────────────────────

/// Summed consumption for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Human-readable period label, e.g. `"January 2024"`.
    pub label: String,
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
    pub total_units: f64,
    pub total_cost: f64,
    /// Number of consumption entries summed into this bucket.
    pub entries: u32,
    /// How many of those entries carried a warning.
    pub warnings: u32,
}

// ── HistoryFilter ─────────────────────────────────────────────────────────────

/// Presets offered by the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    ThisMonth,
    ThisYear,
    Custom(DateRange),
}

impl HistoryFilter {
    /// Resolve to a concrete range relative to `today`; `None` means no limit.
    pub fn to_range(&self, today: NaiveDate) -> Option<DateRange> {
        match self {
            Self::All => None,
            Self::ThisMonth => Some(DateRange::for_month_of(today)),
            Self::ThisYear => DateRange::for_year(today.year()),
            Self::Custom(range) => Some(*range),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::ThisMonth => "This Month",
            Self::ThisYear => "This Year",
            Self::Custom(_) => "Custom Range",
        }
    }
}
