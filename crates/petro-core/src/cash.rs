//! # Cash
//!
//! Money math for the cash custody workflow.
//!
//! ```text
//! liters_sold × rate_per_liter  = total_revenue
//! total_revenue − card_payments = cash_on_hand
//! cash_on_hand  − bank_deposit  = cash_to_am      (owed to the area manager)
//! ```
//!
//! Floating cash is the sum of `cash_to_am` over every transaction whose
//! cash has not reached the bank yet.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{CashTransaction, CustodyStatus};
use crate::validation::{validate_amount, validate_liters, validate_not_exceeding};

// =============================================================================
// Cash Breakdown
// =============================================================================

/// The derived amounts stored on a `CashTransaction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashBreakdown {
    pub total_revenue: Money,
    pub cash_on_hand: Money,
    pub cash_to_am: Money,
}

impl CashBreakdown {
    /// Computes revenue, cash on hand and cash owed to the area manager.
    ///
    /// ## Errors
    /// `Validation` when any input is negative, when card payments exceed
    /// revenue, or when the bank deposit exceeds cash on hand.
    pub fn compute(
        liters_sold: f64,
        rate_per_liter: Money,
        card_payments: Money,
        bank_deposit: Money,
    ) -> CoreResult<CashBreakdown> {
        validate_liters("liters_sold", liters_sold)?;
        validate_amount("rate_per_liter", rate_per_liter)?;
        validate_amount("card_payments", card_payments)?;
        validate_amount("bank_deposit", bank_deposit)?;

        let total_revenue = Money::from_liters_at_rate(liters_sold, rate_per_liter);
        validate_not_exceeding("card_payments", card_payments, "total_revenue", total_revenue)?;

        let cash_on_hand = total_revenue - card_payments;
        validate_not_exceeding("bank_deposit", bank_deposit, "cash_on_hand", cash_on_hand)?;

        Ok(CashBreakdown {
            total_revenue,
            cash_on_hand,
            cash_to_am: cash_on_hand - bank_deposit,
        })
    }
}

// =============================================================================
// Floating Cash
// =============================================================================

/// Undeposited cash across all stations, split by custody state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FloatingCash {
    pub total: Money,
    /// Still with station managers (transfer not yet accepted).
    pub pending_acceptance: Money,
    /// Accepted by area managers, not yet in the bank.
    pub with_am: Money,
    pub transactions: Vec<CashTransaction>,
}

impl FloatingCash {
    /// Builds the summary, ignoring transactions that are already deposited.
    pub fn from_transactions(transactions: Vec<CashTransaction>) -> FloatingCash {
        let transactions: Vec<CashTransaction> = transactions
            .into_iter()
            .filter(|tx| tx.status.is_floating())
            .collect();

        let sum_for = |status: CustodyStatus| -> Money {
            transactions
                .iter()
                .filter(|tx| tx.status == status)
                .map(CashTransaction::cash_to_am)
                .sum()
        };

        let pending_acceptance = sum_for(CustodyStatus::PendingAcceptance);
        let with_am = sum_for(CustodyStatus::WithAm);

        FloatingCash {
            total: pending_acceptance + with_am,
            pending_acceptance,
            with_am,
            transactions,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
