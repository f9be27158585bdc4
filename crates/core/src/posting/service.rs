//! Posting service for line validation, resolution, and enrichment.
//!
//! This service contains pure business logic with no database dependencies.
//! The repository layer resolves item references against the store and feeds
//! the resulting snapshots back in for enrichment.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::PostingError;
use super::tax::{Jurisdiction, TaxSplit, compute_total_tax, taxable_value};
use super::types::{EnrichedLine, ItemSnapshot, LineInput, TransactionStatus, TransactionType};

/// How a requested line resolves to a catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRef {
    /// Reference to an existing item; absence is a not-found error.
    ById(Uuid),
    /// Resolve-or-create by name within the company.
    ByName(String),
}

/// Posting service with pure validation and enrichment logic.
pub struct PostingService;

impl PostingService {
    /// Classifies a requested line.
    ///
    /// Resolution order follows the request shape: an explicit item id wins,
    /// a bare name resolves-or-creates, anything else is malformed.
    ///
    /// # Errors
    ///
    /// Returns `PostingError` if the line is malformed or carries an invalid
    /// quantity or rate.
    pub fn line_reference(line: &LineInput) -> Result<LineRef, PostingError> {
        if line.quantity <= 0 {
            return Err(PostingError::InvalidQuantity(line.quantity));
        }
        if line.rate < Decimal::ZERO {
            return Err(PostingError::NegativeRate);
        }

        match (&line.item_id, &line.name) {
            (Some(id), _) => Ok(LineRef::ById(*id)),
            (None, Some(name)) if !name.trim().is_empty() => {
                Ok(LineRef::ByName(name.trim().to_string()))
            }
            _ => Err(PostingError::MalformedLine),
        }
    }

    /// Enriches a requested line with a resolved item snapshot and tax split.
    ///
    /// `gst_rate` and `hsn_code` are copied from the item at posting time and
    /// never change retroactively.
    #[must_use]
    pub fn enrich_line(
        line: &LineInput,
        item: &ItemSnapshot,
        jurisdiction: Jurisdiction,
    ) -> EnrichedLine {
        let taxable = taxable_value(line.quantity, line.rate);
        let total_tax = compute_total_tax(taxable, item.gst_rate);
        let split = TaxSplit::split(total_tax, jurisdiction);

        EnrichedLine {
            item_id: item.id,
            quantity: line.quantity,
            rate: line.rate,
            gst_rate: item.gst_rate,
            hsn_code: item.hsn_code.clone(),
            taxable_value: taxable,
            cgst: split.cgst,
            sgst: split.sgst,
            igst: split.igst,
        }
    }

    /// Validates that a transaction can be converted to an invoice.
    ///
    /// Conversion is one-way: only estimates convert, and only once.
    ///
    /// # Errors
    ///
    /// Returns `NotAnEstimate` for non-estimate transactions and
    /// `AlreadyInvoiced` if the estimate was converted before.
    pub fn validate_convertible(
        transaction_type: TransactionType,
        status: TransactionStatus,
    ) -> Result<(), PostingError> {
        if transaction_type != TransactionType::Estimate {
            return Err(PostingError::NotAnEstimate);
        }
        if status == TransactionStatus::Invoiced {
            return Err(PostingError::AlreadyInvoiced);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn named_line(name: &str) -> LineInput {
        LineInput {
            item_id: None,
            name: Some(name.to_string()),
            quantity: 10,
            rate: dec!(100),
        }
    }

    fn snapshot(gst_rate: Decimal) -> ItemSnapshot {
        ItemSnapshot {
            id: Uuid::new_v4(),
            gst_rate,
            hsn_code: Some("8471".to_string()),
        }
    }

    #[test]
    fn test_line_reference_prefers_id() {
        let id = Uuid::new_v4();
        let line = LineInput {
            item_id: Some(id),
            name: Some("ignored".to_string()),
            quantity: 1,
            rate: dec!(10),
        };
        assert_eq!(
            PostingService::line_reference(&line).unwrap(),
            LineRef::ById(id)
        );
    }

    #[test]
    fn test_line_reference_by_name_trims() {
        let line = named_line("  Widget ");
        assert_eq!(
            PostingService::line_reference(&line).unwrap(),
            LineRef::ByName("Widget".to_string())
        );
    }

    #[test]
    fn test_line_without_id_or_name_is_malformed() {
        let line = LineInput {
            item_id: None,
            name: None,
            quantity: 1,
            rate: dec!(10),
        };
        assert_eq!(
            PostingService::line_reference(&line),
            Err(PostingError::MalformedLine)
        );

        let blank = LineInput {
            item_id: None,
            name: Some("   ".to_string()),
            quantity: 1,
            rate: dec!(10),
        };
        assert_eq!(
            PostingService::line_reference(&blank),
            Err(PostingError::MalformedLine)
        );
    }

    #[test]
    fn test_zero_and_negative_quantity_rejected() {
        let mut line = named_line("Widget");
        line.quantity = 0;
        assert_eq!(
            PostingService::line_reference(&line),
            Err(PostingError::InvalidQuantity(0))
        );
        line.quantity = -3;
        assert_eq!(
            PostingService::line_reference(&line),
            Err(PostingError::InvalidQuantity(-3))
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut line = named_line("Widget");
        line.rate = dec!(-1);
        assert_eq!(
            PostingService::line_reference(&line),
            Err(PostingError::NegativeRate)
        );
    }

    #[test]
    fn test_enrich_intra_state_line() {
        let line = named_line("Widget");
        let item = snapshot(dec!(18));

        let enriched = PostingService::enrich_line(&line, &item, Jurisdiction::IntraState);

        assert_eq!(enriched.item_id, item.id);
        assert_eq!(enriched.taxable_value, dec!(1000));
        assert_eq!(enriched.cgst, dec!(90));
        assert_eq!(enriched.sgst, dec!(90));
        assert_eq!(enriched.igst, dec!(0));
        assert_eq!(enriched.gst_rate, dec!(18));
        assert_eq!(enriched.hsn_code.as_deref(), Some("8471"));
    }

    #[test]
    fn test_enrich_inter_state_line() {
        let line = named_line("Widget");
        let item = snapshot(dec!(18));

        let enriched = PostingService::enrich_line(&line, &item, Jurisdiction::InterState);

        assert_eq!(enriched.cgst, dec!(0));
        assert_eq!(enriched.sgst, dec!(0));
        assert_eq!(enriched.igst, dec!(180));
        assert_eq!(enriched.total_tax(), dec!(180));
    }

    #[test]
    fn test_convert_draft_estimate_allowed() {
        assert!(
            PostingService::validate_convertible(
                TransactionType::Estimate,
                TransactionStatus::Draft
            )
            .is_ok()
        );
        // Any non-Invoiced status converts (Sent, Accepted, ...)
        assert!(
            PostingService::validate_convertible(
                TransactionType::Estimate,
                TransactionStatus::Accepted
            )
            .is_ok()
        );
    }

    #[test]
    fn test_convert_non_estimate_rejected() {
        assert_eq!(
            PostingService::validate_convertible(TransactionType::Sale, TransactionStatus::Draft),
            Err(PostingError::NotAnEstimate)
        );
    }

    #[test]
    fn test_convert_twice_rejected() {
        assert_eq!(
            PostingService::validate_convertible(
                TransactionType::Estimate,
                TransactionStatus::Invoiced
            ),
            Err(PostingError::AlreadyInvoiced)
        );
    }
}
