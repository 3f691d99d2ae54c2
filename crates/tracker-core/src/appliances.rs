//! Expected consumption from an inventory of household appliances.

use serde::{Deserialize, Serialize};

use crate::billing::estimate_cost;
use crate::error::{Result, TrackerError};

/// Days per month used for the monthly projection.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Differences smaller than this (kWh) count as matching the estimate.
pub const CLOSE_ENOUGH_KWH: f64 = 1.0;

/// A device with a rated power draw and typical daily usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAppliance")]
pub struct Appliance {
    pub name: String,
    pub power_watts: f64,
    pub hours_per_day: f64,
}

impl Appliance {
    /// Validate and build an appliance.
    ///
    /// The name is trimmed; power must be positive and hours must lie in
    /// `(0, 24]`.
    pub fn new(name: &str, power_watts: f64, hours_per_day: f64) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::validation("appliance name is required"));
        }
        if !power_watts.is_finite() || power_watts <= 0.0 {
            return Err(TrackerError::validation("power must be a positive number"));
        }
        if !hours_per_day.is_finite() || hours_per_day <= 0.0 {
            return Err(TrackerError::validation("hours must be a positive number"));
        }
        if hours_per_day > 24.0 {
            return Err(TrackerError::validation("hours per day cannot exceed 24"));
        }
        Ok(Self {
            name: name.to_string(),
            power_watts,
            hours_per_day,
        })
    }

    pub fn daily_kwh(&self) -> f64 {
        self.power_watts * self.hours_per_day / 1000.0
    }

    pub fn monthly_kwh(&self) -> f64 {
        self.daily_kwh() * DAYS_PER_MONTH
    }
}

#[derive(Deserialize)]
struct RawAppliance {
    name: String,
    power_watts: f64,
    hours_per_day: f64,
}

impl TryFrom<RawAppliance> for Appliance {
    type Error = TrackerError;

    fn try_from(raw: RawAppliance) -> Result<Self> {
        Appliance::new(&raw.name, raw.power_watts, raw.hours_per_day)
    }
}

/// Projected monthly usage for a set of appliances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplianceEstimate {
    pub monthly_kwh: f64,
    pub monthly_cost: f64,
}

pub fn estimate_monthly(appliances: &[Appliance], unit_rate: f64) -> ApplianceEstimate {
    let monthly_kwh: f64 = appliances.iter().map(Appliance::monthly_kwh).sum();
    ApplianceEstimate {
        monthly_kwh,
        monthly_cost: estimate_cost(monthly_kwh, unit_rate),
    }
}

/// How this month's metered usage compares to the appliance estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EstimateComparison {
    /// Nothing metered this month yet.
    NoUsageYet,
    CloseToEstimate { actual_kwh: f64 },
    AboveEstimate { actual_kwh: f64, difference_kwh: f64 },
    BelowEstimate { actual_kwh: f64, difference_kwh: f64 },
}

pub fn compare_with_actual(actual_kwh: f64, estimate: &ApplianceEstimate) -> EstimateComparison {
    if actual_kwh <= 0.0 {
        return EstimateComparison::NoUsageYet;
    }
    let difference = actual_kwh - estimate.monthly_kwh;
    if difference.abs() < CLOSE_ENOUGH_KWH {
        EstimateComparison::CloseToEstimate { actual_kwh }
    } else if difference > 0.0 {
        EstimateComparison::AboveEstimate {
            actual_kwh,
            difference_kwh: difference,
        }
    } else {
        EstimateComparison::BelowEstimate {
            actual_kwh,
            difference_kwh: difference.abs(),
        }
    }
}
