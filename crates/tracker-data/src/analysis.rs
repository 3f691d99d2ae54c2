//! Headline figures for the summary strip and the appliance comparison.

use chrono::NaiveDate;

use tracker_core::appliances::{compare_with_actual, ApplianceEstimate, EstimateComparison};
use tracker_core::billing::estimate_cost;
use tracker_core::models::{DateRange, Reading};

use crate::aggregator::compute_consumption;

/// Totals over the whole log plus the current calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub total_units: f64,
    pub total_cost: f64,
    pub this_month_units: f64,
    pub this_month_cost: f64,
    pub unit_rate: f64,
    /// Latest meter value by date, `None` for an empty log.
    pub current_reading: Option<f64>,
    pub readings_count: usize,
    /// Consumption entries flagged with a warning.
    pub warnings_count: usize,
}

impl UsageSummary {
    pub fn has_history(&self) -> bool {
        self.readings_count > 0
    }
}

/// Summarise `readings` as of `today`.
pub fn summarize(readings: &[Reading], unit_rate: f64, today: NaiveDate) -> UsageSummary {
    let entries = compute_consumption(readings);
    let month = DateRange::for_month_of(today);

    let total_units: f64 = entries.iter().map(|e| e.delta_units).sum();
    let this_month_units: f64 = entries
        .iter()
        .filter(|e| month.contains(e.date))
        .map(|e| e.delta_units)
        .sum();

    // Latest by date; ties resolve to the last one logged.
    let current_reading = readings
        .iter()
        .enumerate()
        .max_by_key(|(i, r)| (r.date, *i))
        .map(|(_, r)| r.value);

    UsageSummary {
        total_units,
        total_cost: estimate_cost(total_units, unit_rate),
        this_month_units,
        this_month_cost: estimate_cost(this_month_units, unit_rate),
        unit_rate,
        current_reading,
        readings_count: readings.len(),
        warnings_count: entries.iter().filter(|e| e.warning.is_some()).count(),
    }
}

/// Compare this month's metered usage with an appliance estimate.
pub fn compare_month_to_estimate(
    summary: &UsageSummary,
    estimate: &ApplianceEstimate,
) -> EstimateComparison {
    compare_with_actual(summary.this_month_units, estimate)
}
