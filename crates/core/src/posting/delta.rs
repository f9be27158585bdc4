//! Stock delta rules.
//!
//! Posting a transaction applies one signed delta per line to the referenced
//! item's stock; deleting a transaction applies the exact negation. Stock is
//! therefore always derivable from the surviving transaction history.

use super::types::{StockDirection, TransactionType};

/// Signed stock change for one line when a transaction is posted.
#[must_use]
pub const fn stock_delta(transaction_type: TransactionType, quantity: i64) -> i64 {
    match transaction_type.stock_direction() {
        StockDirection::Decrease => -quantity,
        StockDirection::Increase => quantity,
        StockDirection::None => 0,
    }
}

/// Signed stock change for one line when a transaction is deleted.
#[must_use]
pub const fn reversal_delta(transaction_type: TransactionType, quantity: i64) -> i64 {
    -stock_delta(transaction_type, quantity)
}
