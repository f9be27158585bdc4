//! Transaction posting logic.
//!
//! This module implements the pure half of the posting engine:
//! - Domain types for transactions and line items
//! - GST tax computation (CGST/SGST vs IGST jurisdiction split)
//! - Stock delta rules per transaction type
//! - Line validation and enrichment
//! - Quotation-to-invoice conversion guards

pub mod delta;
pub mod error;
pub mod service;
pub mod tax;
pub mod types;

#[cfg(test)]
mod tax_props;

pub use delta::{reversal_delta, stock_delta};
pub use error::PostingError;
pub use service::{LineRef, PostingService};
pub use tax::{Jurisdiction, TaxSplit, compute_total_tax, party_state_code, taxable_value};
pub use types::{
    EnrichedLine, ItemSnapshot, LineInput, StockDirection, TransactionStatus, TransactionType,
};
