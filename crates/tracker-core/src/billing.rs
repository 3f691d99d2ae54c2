//! The linear bill formula.

/// Rate applied when no configuration overrides it, in currency per unit.
pub const DEFAULT_UNIT_RATE: f64 = 12.0;

/// Cost of `delta_units` at `unit_rate`.
///
/// ```
/// use tracker_core::billing::estimate_cost;
///
/// assert_eq!(estimate_cost(50.0, 12.0), 600.0);
/// ```
pub fn estimate_cost(delta_units: f64, unit_rate: f64) -> f64 {
    delta_units * unit_rate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_cost_default_rate() {
        assert_eq!(estimate_cost(50.0, DEFAULT_UNIT_RATE), 600.0);
    }

    #[test]
    fn test_estimate_cost_zero_units() {
        assert_eq!(estimate_cost(0.0, 12.0), 0.0);
    }

    #[test]
    fn test_estimate_cost_negative_delta_passes_through() {
        // Negative deltas are surfaced, not clamped.
        assert_eq!(estimate_cost(-20.0, 12.0), -240.0);
    }

    #[test]
    fn test_estimate_cost_fractional() {
        assert!((estimate_cost(12.5, 7.5) - 93.75).abs() < 1e-9);
    }
}
