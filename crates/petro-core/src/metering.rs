//! # Metering
//!
//! Consumption math for nozzle meters.
//!
//! ```text
//!   previous shift          this shift
//!   ┌──────────────┐        ┌──────────────────────────────┐
//!   │ closing 100  │ ─────► │ opening 100   closing 150    │ → consumption 50
//!   └──────────────┘        └──────────────────────────────┘
//!
//!   nozzle P1 ─┐
//!   nozzle P2 ─┼─► tank T : Σ consumption ─► one ledger debit per tank
//!   nozzle P3 ─┘
//! ```
//!
//! Meters never run backwards here: a closing value below the opening value
//! is rejected, never treated as a rollover.

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_liters;
use crate::LITER_EPSILON;

/// Liters dispensed between two meter values.
///
/// ## Errors
/// - `Validation` if either value is negative or not finite
/// - `InvalidReading` if `closing < opening`
///
/// ## Example
/// ```rust
/// use petro_core::metering::consumption;
///
/// assert_eq!(consumption("P1", 100.0, 150.0).unwrap(), 50.0);
/// assert!(consumption("P1", 150.0, 120.0).is_err());
/// ```
pub fn consumption(nozzle: &str, opening: f64, closing: f64) -> CoreResult<f64> {
    validate_liters("opening_reading", opening)?;
    validate_liters("closing_reading", closing)?;

    let liters = closing - opening;
    if liters < 0.0 {
        return Err(CoreError::InvalidReading {
            nozzle: nozzle.to_string(),
            opening,
            closing,
        });
    }
    Ok(liters)
}

/// Net tank adjustment when a reading's consumption changes from `old` to `new`.
///
/// Positive means more fuel left the tank. A reading that was never closed
/// counts as zero consumption.
pub fn consumption_delta(old: Option<f64>, new: f64) -> f64 {
    new - old.unwrap_or(0.0)
}

/// Accumulates liters per tank.
///
/// Keys are ordered so that tanks are always debited in the same order,
/// which keeps concurrent submissions from taking row locks in different
/// sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TankTotals {
    totals: BTreeMap<String, f64>,
}

impl TankTotals {
    pub fn new() -> Self {
        TankTotals::default()
    }

    pub fn add(&mut self, tank_id: &str, liters: f64) {
        *self.totals.entry(tank_id.to_string()).or_insert(0.0) += liters;
    }

    /// Liters recorded for `tank_id` (0 if none).
    pub fn get(&self, tank_id: &str) -> f64 {
        self.totals.get(tank_id).copied().unwrap_or(0.0)
    }

    /// Tanks with a non-negligible total, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals
            .iter()
            .filter(|(_, liters)| liters.abs() > LITER_EPSILON)
            .map(|(tank, liters)| (tank.as_str(), *liters))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl<'a> FromIterator<(&'a str, f64)> for TankTotals {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        let mut totals = TankTotals::new();
        for (tank, liters) in iter {
            totals.add(tank, liters);
        }
        totals
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_consumption_is_meter_delta() {
        assert_eq!(consumption("P1", 0.0, 42.5).unwrap(), 42.5);
        assert_eq!(consumption("P1", 150.0, 150.0).unwrap(), 0.0);
    }

    #[test]
    fn test_backwards_meter_is_invalid_input() {
        let err = consumption("P1", 150.0, 120.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidReading { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_non_finite_meter_rejected() {
        assert!(consumption("P1", 0.0, f64::NAN).is_err());
        assert!(consumption("P1", -1.0, 5.0).is_err());
    }

    #[test]
    fn test_consumption_delta() {
        assert_eq!(consumption_delta(None, 50.0), 50.0);
        assert_eq!(consumption_delta(Some(50.0), 60.0), 10.0);
        assert_eq!(consumption_delta(Some(60.0), 60.0), 0.0);
        assert_eq!(consumption_delta(Some(60.0), 45.0), -15.0);
    }

    #[test]
    fn test_tank_totals_aggregate_nozzles() {
        let totals: TankTotals = vec![("tank-a", 10.0), ("tank-b", 5.0), ("tank-a", 2.5)]
            .into_iter()
            .collect();

        assert_eq!(totals.get("tank-a"), 12.5);
        assert_eq!(totals.get("tank-c"), 0.0);

        let ordered: Vec<_> = totals.iter().collect();
        assert_eq!(ordered, vec![("tank-a", 12.5), ("tank-b", 5.0)]);
    }

    #[test]
    fn test_tank_totals_skip_zero() {
        let totals: TankTotals = vec![("tank-a", 0.0)].into_iter().collect();
        assert!(totals.is_empty());
    }
}
