//! # Reconciliation
//!
//! Compares the two consumption tracks of a shift: what the meters say left
//! the nozzle and what the sales lines say was sold. Both tracks debit the
//! tank independently, so a variance here means the tank level has drifted
//! from at least one of them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::types::{NozzleReading, NozzleSale};
use crate::LITER_EPSILON;

/// One nozzle's readings-vs-sales comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NozzleVariance {
    pub nozzle_id: String,
    /// `None` when no closing reading was recorded.
    pub reading_consumption: Option<f64>,
    pub sold_quantity: f64,
    /// sold − metered.
    pub variance: f64,
}

impl NozzleVariance {
    pub fn is_balanced(&self) -> bool {
        self.variance.abs() <= LITER_EPSILON
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ShiftReconciliation {
    pub shift_id: String,
    pub nozzles: Vec<NozzleVariance>,
    pub total_reading_consumption: f64,
    pub total_sold: f64,
}

impl ShiftReconciliation {
    /// Compares readings and sales of one shift, nozzle by nozzle.
    ///
    /// Nozzles appearing on only one side are still reported.
    pub fn build(shift_id: &str, readings: &[NozzleReading], sales: &[NozzleSale]) -> Self {
        let mut rows: BTreeMap<&str, (Option<f64>, f64)> = BTreeMap::new();

        for reading in readings {
            rows.entry(reading.nozzle_id.as_str()).or_insert((None, 0.0)).0 = reading.consumption;
        }
        for sale in sales {
            rows.entry(sale.nozzle_id.as_str()).or_insert((None, 0.0)).1 += sale.quantity_liters;
        }

        let nozzles: Vec<NozzleVariance> = rows
            .into_iter()
            .map(|(nozzle_id, (metered, sold))| NozzleVariance {
                nozzle_id: nozzle_id.to_string(),
                reading_consumption: metered,
                sold_quantity: sold,
                variance: sold - metered.unwrap_or(0.0),
            })
            .collect();

        ShiftReconciliation {
            shift_id: shift_id.to_string(),
            total_reading_consumption: nozzles
                .iter()
                .filter_map(|n| n.reading_consumption)
                .sum(),
            total_sold: nozzles.iter().map(|n| n.sold_quantity).sum(),
            nozzles,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.nozzles.iter().all(NozzleVariance::is_balanced)
    }

    /// Nozzles whose tracks disagree.
    pub fn mismatches(&self) -> impl Iterator<Item = &NozzleVariance> {
        self.nozzles.iter().filter(|n| !n.is_balanced())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
