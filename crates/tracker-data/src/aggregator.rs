//! Consumption deltas, bill estimates and period buckets.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use tracker_core::billing::estimate_cost;
use tracker_core::config::TrackerConfig;
use tracker_core::formatting::ordinal;
use tracker_core::models::{Bucket, ConsumptionEntry, DeltaWarning, Granularity, Reading};
use tracker_core::time_utils::{last_day_of_month, month_name, week_of_month, week_of_month_bounds};

// ── Consumption ───────────────────────────────────────────────────────────────

/// Difference between each reading and the one before it.
///
/// Readings are ordered by date first (stable, so same-day readings keep
/// their log order). Zero or one reading yields no entries. A decrease is
/// kept as a negative delta and flagged with [`DeltaWarning::NegativeDelta`].
pub fn compute_consumption(readings: &[Reading]) -> Vec<ConsumptionEntry> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.date);

    ordered
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (pair[0], pair[1]);
            let delta_units = cur.value - prev.value;
            let warning = if delta_units < 0.0 {
                warn!(
                    "meter went backwards on {}: {:.2} -> {:.2}",
                    cur.date, prev.value, cur.value
                );
                Some(DeltaWarning::NegativeDelta { delta: delta_units })
            } else {
                None
            };
            ConsumptionEntry {
                date: cur.date,
                previous_value: prev.value,
                value: cur.value,
                delta_units,
                warning,
            }
        })
        .collect()
}

// ── Buckets ───────────────────────────────────────────────────────────────────

/// Running totals for one period.
struct PeriodAccumulator {
    label: String,
    start: NaiveDate,
    end: NaiveDate,
    units: f64,
    entries: u32,
    warnings: u32,
}

impl PeriodAccumulator {
    fn new(label: String, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            label,
            start,
            end,
            units: 0.0,
            entries: 0,
            warnings: 0,
        }
    }

    fn add_entry(&mut self, entry: &ConsumptionEntry) {
        self.units += entry.delta_units;
        self.entries += 1;
        if entry.warning.is_some() {
            self.warnings += 1;
        }
    }

    fn into_bucket(self, unit_rate: f64) -> Bucket {
        Bucket {
            label: self.label,
            start: self.start,
            end: self.end,
            total_units: self.units,
            total_cost: estimate_cost(self.units, unit_rate),
            entries: self.entries,
            warnings: self.warnings,
        }
    }
}

/// The period containing `date` as `(start, end, label)`, or `None` when a
/// custom range excludes it.
fn period_of(date: NaiveDate, granularity: &Granularity) -> Option<(NaiveDate, NaiveDate, String)> {
    match granularity {
        Granularity::Day => Some((date, date, date.format("%Y-%m-%d").to_string())),
        Granularity::Week => {
            let (start, end) = week_of_month_bounds(date);
            let label = format!(
                "{} week {} {}",
                ordinal(week_of_month(date)),
                month_name(date.month()),
                date.year()
            );
            Some((start, end, label))
        }
        Granularity::Month => {
            let start = date.with_day(1)?;
            let end = last_day_of_month(date.year(), date.month())?;
            let label = format!("{} {}", month_name(date.month()), date.year());
            Some((start, end, label))
        }
        Granularity::Year => {
            let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
            let end = NaiveDate::from_ymd_opt(date.year(), 12, 31)?;
            Some((start, end, date.year().to_string()))
        }
        Granularity::Custom(range) => {
            if !range.contains(date) {
                return None;
            }
            let label = format!(
                "{} to {}",
                range.start().format("%d %b %Y"),
                range.end().format("%d %b %Y")
            );
            Some((range.start(), range.end(), label))
        }
    }
}

/// Group consumption deltas by the period containing each delta's date.
///
/// Buckets are ordered by period start; periods without any delta are left
/// out. Negative deltas are summed as-is and counted in
/// [`Bucket::warnings`].
pub fn bucket_by(readings: &[Reading], granularity: Granularity, unit_rate: f64) -> Vec<Bucket> {
    let mut periods: BTreeMap<NaiveDate, PeriodAccumulator> = BTreeMap::new();

    for entry in compute_consumption(readings) {
        let Some((start, end, label)) = period_of(entry.date, &granularity) else {
            continue;
        };
        periods
            .entry(start)
            .or_insert_with(|| PeriodAccumulator::new(label, start, end))
            .add_entry(&entry);
    }

    periods
        .into_values()
        .map(|p| p.into_bucket(unit_rate))
        .collect()
}

/// Distinct calendar years with at least one reading, ascending.
pub fn available_years(readings: &[Reading]) -> Vec<i32> {
    let mut years: Vec<i32> = readings.iter().map(|r| r.date.year()).collect();
    years.sort_unstable();
    years.dedup();
    years
}

// ── ConsumptionEngine ─────────────────────────────────────────────────────────

/// The aggregation functions bound to a configured unit rate.
#[derive(Debug, Clone)]
pub struct ConsumptionEngine {
    unit_rate: f64,
}

impl ConsumptionEngine {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            unit_rate: config.unit_rate,
        }
    }

    pub fn unit_rate(&self) -> f64 {
        self.unit_rate
    }

    pub fn compute_consumption(&self, readings: &[Reading]) -> Vec<ConsumptionEntry> {
        compute_consumption(readings)
    }

    pub fn estimate_cost(&self, delta_units: f64) -> f64 {
        estimate_cost(delta_units, self.unit_rate)
    }

    pub fn bucket_by(&self, readings: &[Reading], granularity: Granularity) -> Vec<Bucket> {
        bucket_by(readings, granularity, self.unit_rate)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
