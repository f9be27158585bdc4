//! Transaction repository: the posting engine.
//!
//! Posting a transaction resolves item references, snapshots tax fields,
//! splits GST by jurisdiction, and applies stock deltas, all inside one
//! database transaction. Deleting a transaction reverses its stock effects
//! before the rows go away, so stock always equals opening stock plus the
//! sum of the surviving history.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use vypar_core::posting::{
    self, ItemSnapshot, Jurisdiction, LineInput, LineRef, PostingError, PostingService,
    party_state_code, reversal_delta, stock_delta,
};
use vypar_shared::types::CompanyScope;

use crate::entities::{
    items, parties, transaction_lines, transactions,
    sea_orm_active_enums::{TransactionStatus, TransactionType},
};
use crate::repositories::item::ItemRepository;
use crate::repositories::sequence::SequenceRepository;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// Validation or reference failure from the posting rules.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Transaction number already used for this company and type.
    #[error("Transaction number \"{0}\" is already in use")]
    DuplicateNumber(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for posting a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Transaction type.
    pub transaction_type: posting::TransactionType,
    /// Document number, unique per company and type.
    pub transaction_number: String,
    /// Initial status.
    pub status: posting::TransactionStatus,
    /// Optional party reference.
    pub party_id: Option<Uuid>,
    /// Document date; defaults to now.
    pub transaction_date: Option<DateTimeWithTimeZone>,
    /// Requested line items.
    pub lines: Vec<LineInput>,
    /// Document-level discount.
    pub discount: Decimal,
    /// Grand total as presented to the party.
    pub total_amount: Decimal,
    /// Amount settled at posting time.
    pub amount_paid: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Editable header fields for an existing transaction.
///
/// Lines and their stock effects are immutable after posting; correcting
/// them means deleting and re-posting.
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    /// New status.
    pub status: Option<posting::TransactionStatus>,
    /// New document date.
    pub transaction_date: Option<DateTimeWithTimeZone>,
    /// New discount.
    pub discount: Option<Decimal>,
    /// New grand total.
    pub total_amount: Option<Decimal>,
    /// New settled amount.
    pub amount_paid: Option<Decimal>,
    /// New notes.
    pub notes: Option<String>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to these types; empty means all.
    pub types: Vec<posting::TransactionType>,
    /// Restrict to one party.
    pub party_id: Option<Uuid>,
    /// Inclusive start date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive end date (the whole day is covered).
    pub date_to: Option<NaiveDate>,
}

/// A transaction with resolved display names.
#[derive(Debug, Clone)]
pub struct TransactionView {
    /// Transaction header.
    pub transaction: transactions::Model,
    /// Name of the referenced party, if any.
    pub party_name: Option<String>,
    /// Line items in line-number order.
    pub lines: Vec<LineView>,
}

/// A transaction line with its item's display name.
#[derive(Debug, Clone)]
pub struct LineView {
    /// Line row.
    pub line: transaction_lines::Model,
    /// Name of the referenced item.
    pub item_name: String,
}

/// Transaction repository for posting, querying, and conversion.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a new transaction.
    ///
    /// Resolves each line to a catalog item (creating items referenced by
    /// name), snapshots GST fields, splits tax by jurisdiction, and applies
    /// stock deltas. The header, lines, and stock changes commit together or
    /// not at all.
    ///
    /// # Errors
    ///
    /// Returns a `Posting` error for malformed lines or dangling references,
    /// `DuplicateNumber` if the document number is taken, or `Database` on
    /// storage failures.
    pub async fn create_transaction(
        &self,
        scope: &CompanyScope,
        company_state_code: Option<&str>,
        input: CreateTransactionInput,
    ) -> Result<TransactionView, TransactionError> {
        // Validate all lines before touching the database
        let mut refs = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            refs.push(PostingService::line_reference(line)?);
        }

        let txn = self.db.begin().await?;

        // Party snapshot drives the CGST/SGST vs IGST decision
        let party = match input.party_id {
            Some(party_id) => Some(
                parties::Entity::find_by_id(party_id)
                    .filter(parties::Column::CompanyCode.eq(scope.company_code()))
                    .one(&txn)
                    .await?
                    .ok_or(PostingError::PartyNotFound(party_id))?,
            ),
            None => None,
        };
        let jurisdiction = Jurisdiction::determine(
            company_state_code,
            party_state_code(party.as_ref().and_then(|p| p.gstin.as_deref())),
        );

        // Resolve items and enrich lines with tax snapshots
        let mut item_names: HashMap<Uuid, String> = HashMap::new();
        let mut enriched = Vec::with_capacity(input.lines.len());
        for (line, line_ref) in input.lines.iter().zip(&refs) {
            let item = Self::resolve_item(&txn, scope, line, line_ref).await?;
            let snapshot = ItemSnapshot {
                id: item.id,
                gst_rate: item.gst_rate,
                hsn_code: item.hsn_code.clone(),
            };
            item_names.insert(item.id, item.name);
            enriched.push(PostingService::enrich_line(line, &snapshot, jurisdiction));
        }

        let subtotal: Decimal = enriched.iter().map(|l| l.taxable_value).sum();
        let now: DateTimeWithTimeZone = Utc::now().into();
        let transaction_id = Uuid::new_v4();

        let header = transactions::ActiveModel {
            id: Set(transaction_id),
            company_code: Set(scope.company_code().to_owned()),
            transaction_type: Set(input.transaction_type.into()),
            status: Set(input.status.into()),
            transaction_number: Set(input.transaction_number.clone()),
            party_id: Set(input.party_id),
            party_gstin: Set(party.as_ref().and_then(|p| p.gstin.clone())),
            subtotal: Set(subtotal),
            discount: Set(input.discount),
            total_amount: Set(input.total_amount),
            amount_paid: Set(input.amount_paid),
            balance_due: Set(input.total_amount - input.amount_paid),
            transaction_date: Set(input.transaction_date.unwrap_or(now)),
            converted_from: Set(None),
            notes: Set(input.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let header = match header.insert(&txn).await {
            Ok(model) => model,
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    return Err(TransactionError::DuplicateNumber(input.transaction_number));
                }
                _ => return Err(TransactionError::Database(e)),
            },
        };

        // Insert lines and apply stock deltas
        let mut line_views = Vec::with_capacity(enriched.len());
        let mut line_no: i32 = 0;
        for line in &enriched {
            line_no += 1;
            let inserted = transaction_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(transaction_id),
                item_id: Set(line.item_id),
                line_no: Set(line_no),
                quantity: Set(line.quantity),
                rate: Set(line.rate),
                gst_rate: Set(line.gst_rate),
                hsn_code: Set(line.hsn_code.clone()),
                taxable_value: Set(line.taxable_value),
                cgst: Set(line.cgst),
                sgst: Set(line.sgst),
                igst: Set(line.igst),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;

            let delta = stock_delta(input.transaction_type, line.quantity);
            if delta != 0 {
                ItemRepository::adjust_stock_in(&txn, line.item_id, delta).await?;
            }

            let item_name = item_names.get(&line.item_id).cloned().unwrap_or_default();
            line_views.push(LineView {
                line: inserted,
                item_name,
            });
        }

        txn.commit().await?;

        tracing::debug!(
            transaction_id = %header.id,
            transaction_number = %header.transaction_number,
            "transaction posted"
        );

        Ok(TransactionView {
            transaction: header,
            party_name: party.map(|p| p.name),
            lines: line_views,
        })
    }

    /// Resolves one line against the catalog inside the posting transaction.
    async fn resolve_item(
        txn: &DatabaseTransaction,
        scope: &CompanyScope,
        line: &LineInput,
        line_ref: &LineRef,
    ) -> Result<items::Model, TransactionError> {
        match line_ref {
            LineRef::ById(item_id) => Ok(items::Entity::find_by_id(*item_id)
                .filter(items::Column::CompanyCode.eq(scope.company_code()))
                .one(txn)
                .await?
                .ok_or(PostingError::ItemNotFound(*item_id))?),
            LineRef::ByName(name) => {
                Ok(ItemRepository::resolve_or_create_in(txn, scope, name, line.rate).await?)
            }
        }
    }

    /// Lists transactions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        scope: &CompanyScope,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionView>, TransactionError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::CompanyCode.eq(scope.company_code()));

        if !filter.types.is_empty() {
            let types: Vec<TransactionType> =
                filter.types.iter().map(|tt| (*tt).into()).collect();
            query = query.filter(transactions::Column::TransactionType.is_in(types));
        }

        if let Some(party_id) = filter.party_id {
            query = query.filter(transactions::Column::PartyId.eq(party_id));
        }

        if let Some(from) = filter.date_from {
            query = query.filter(transactions::Column::TransactionDate.gte(day_start(from)));
        }

        if let Some(to) = filter.date_to {
            if let Some(end) = day_end_exclusive(to) {
                query = query.filter(transactions::Column::TransactionDate.lt(end));
            }
        }

        let headers = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;

        self.load_views(headers).await
    }

    /// Gets a transaction by ID with lines and display names.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist in this company.
    pub async fn get_transaction(
        &self,
        scope: &CompanyScope,
        transaction_id: Uuid,
    ) -> Result<TransactionView, TransactionError> {
        let header = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::CompanyCode.eq(scope.company_code()))
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(transaction_id))?;

        let mut views = self.load_views(vec![header]).await?;
        views.pop().ok_or(TransactionError::NotFound(transaction_id))
    }

    /// Updates header fields of an existing transaction.
    ///
    /// `balance_due` is recomputed from the effective total and paid amounts.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist in this company.
    pub async fn update_transaction(
        &self,
        scope: &CompanyScope,
        transaction_id: Uuid,
        input: UpdateTransactionInput,
    ) -> Result<TransactionView, TransactionError> {
        let existing = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::CompanyCode.eq(scope.company_code()))
            .one(&self.db)
            .await?
            .ok_or(TransactionError::NotFound(transaction_id))?;

        let total = input.total_amount.unwrap_or(existing.total_amount);
        let paid = input.amount_paid.unwrap_or(existing.amount_paid);

        let mut active: transactions::ActiveModel = existing.into();
        if let Some(status) = input.status {
            active.status = Set(status.into());
        }
        if let Some(date) = input.transaction_date {
            active.transaction_date = Set(date);
        }
        if let Some(discount) = input.discount {
            active.discount = Set(discount);
        }
        active.total_amount = Set(total);
        active.amount_paid = Set(paid);
        active.balance_due = Set(total - paid);
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await?;

        self.get_transaction(scope, transaction_id).await
    }

    /// Deletes a transaction, reversing its stock effects first.
    ///
    /// Each line's stock delta is negated and applied before the rows are
    /// removed, inside one database transaction. Lines go away with the
    /// header via cascade.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the transaction does not exist in this company.
    pub async fn delete_transaction(
        &self,
        scope: &CompanyScope,
        transaction_id: Uuid,
    ) -> Result<(), TransactionError> {
        let txn = self.db.begin().await?;

        let header = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::CompanyCode.eq(scope.company_code()))
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(transaction_id))?;

        let lines = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.eq(transaction_id))
            .all(&txn)
            .await?;

        let transaction_type: posting::TransactionType = header.transaction_type.into();
        for line in &lines {
            let delta = reversal_delta(transaction_type, line.quantity);
            if delta != 0 {
                ItemRepository::adjust_stock_in(&txn, line.item_id, delta).await?;
            }
        }

        transactions::Entity::delete_by_id(transaction_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::debug!(transaction_id = %transaction_id, "transaction deleted, stock reversed");

        Ok(())
    }

    /// Converts an estimate into a sale invoice.
    ///
    /// Creates a new sale transaction with a server-generated number, copies
    /// the estimate's lines and totals, applies sale stock deltas, and marks
    /// the source as `Invoiced`. Conversion is one-way and one-time.
    ///
    /// # Errors
    ///
    /// Returns `NotAnEstimate` for non-estimate sources, `AlreadyInvoiced`
    /// if the estimate was converted before, `NotFound` if it does not exist
    /// in this company, and `DuplicateNumber` if the generated sale number is
    /// already occupied by a client-supplied document.
    pub async fn convert_to_invoice(
        &self,
        scope: &CompanyScope,
        transaction_id: Uuid,
    ) -> Result<TransactionView, TransactionError> {
        let txn = self.db.begin().await?;

        let source = transactions::Entity::find_by_id(transaction_id)
            .filter(transactions::Column::CompanyCode.eq(scope.company_code()))
            .one(&txn)
            .await?
            .ok_or(TransactionError::NotFound(transaction_id))?;

        PostingService::validate_convertible(
            source.transaction_type.into(),
            source.status.into(),
        )?;

        let lines = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.eq(source.id))
            .order_by_asc(transaction_lines::Column::LineNo)
            .all(&txn)
            .await?;

        let number =
            SequenceRepository::next_number_in(&txn, scope, posting::TransactionType::Sale)
                .await?;
        let now: DateTimeWithTimeZone = Utc::now().into();
        let invoice_id = Uuid::new_v4();

        let invoice = transactions::ActiveModel {
            id: Set(invoice_id),
            company_code: Set(scope.company_code().to_owned()),
            transaction_type: Set(TransactionType::Sale),
            status: Set(TransactionStatus::Draft),
            transaction_number: Set(number.to_string()),
            party_id: Set(source.party_id),
            party_gstin: Set(source.party_gstin.clone()),
            subtotal: Set(source.subtotal),
            discount: Set(source.discount),
            total_amount: Set(source.total_amount),
            amount_paid: Set(Decimal::ZERO),
            balance_due: Set(source.total_amount),
            transaction_date: Set(now),
            converted_from: Set(Some(source.id)),
            notes: Set(source.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        if let Err(e) = invoice.insert(&txn).await {
            return match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(TransactionError::DuplicateNumber(number.to_string()))
                }
                _ => Err(TransactionError::Database(e)),
            };
        }

        // Copy lines; the estimate never touched stock, the sale does
        for line in &lines {
            transaction_lines::ActiveModel {
                id: Set(Uuid::new_v4()),
                transaction_id: Set(invoice_id),
                item_id: Set(line.item_id),
                line_no: Set(line.line_no),
                quantity: Set(line.quantity),
                rate: Set(line.rate),
                gst_rate: Set(line.gst_rate),
                hsn_code: Set(line.hsn_code.clone()),
                taxable_value: Set(line.taxable_value),
                cgst: Set(line.cgst),
                sgst: Set(line.sgst),
                igst: Set(line.igst),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;

            let delta = stock_delta(posting::TransactionType::Sale, line.quantity);
            if delta != 0 {
                ItemRepository::adjust_stock_in(&txn, line.item_id, delta).await?;
            }
        }

        let mut source_active: transactions::ActiveModel = source.into();
        source_active.status = Set(TransactionStatus::Invoiced);
        source_active.updated_at = Set(now);
        source_active.update(&txn).await?;

        txn.commit().await?;

        tracing::debug!(
            estimate_id = %transaction_id,
            invoice_id = %invoice_id,
            "estimate converted to invoice"
        );

        self.get_transaction(scope, invoice_id).await
    }

    /// Attaches lines, party names, and item names to transaction headers.
    async fn load_views(
        &self,
        headers: Vec<transactions::Model>,
    ) -> Result<Vec<TransactionView>, TransactionError> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let transaction_ids: Vec<Uuid> = headers.iter().map(|t| t.id).collect();
        let lines = transaction_lines::Entity::find()
            .filter(transaction_lines::Column::TransactionId.is_in(transaction_ids))
            .order_by_asc(transaction_lines::Column::LineNo)
            .all(&self.db)
            .await?;

        let party_ids: Vec<Uuid> = headers.iter().filter_map(|t| t.party_id).collect();
        let party_names: HashMap<Uuid, String> = if party_ids.is_empty() {
            HashMap::new()
        } else {
            parties::Entity::find()
                .filter(parties::Column::Id.is_in(party_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect()
        };

        let item_ids: Vec<Uuid> = lines.iter().map(|l| l.item_id).collect();
        let item_names: HashMap<Uuid, String> = if item_ids.is_empty() {
            HashMap::new()
        } else {
            items::Entity::find()
                .filter(items::Column::Id.is_in(item_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|i| (i.id, i.name))
                .collect()
        };

        let mut lines_by_transaction: HashMap<Uuid, Vec<LineView>> = HashMap::new();
        for line in lines {
            let item_name = item_names.get(&line.item_id).cloned().unwrap_or_default();
            lines_by_transaction
                .entry(line.transaction_id)
                .or_default()
                .push(LineView { line, item_name });
        }

        Ok(headers
            .into_iter()
            .map(|transaction| {
                let party_name = transaction
                    .party_id
                    .and_then(|id| party_names.get(&id).cloned());
                let lines = lines_by_transaction
                    .remove(&transaction.id)
                    .unwrap_or_default();
                TransactionView {
                    transaction,
                    party_name,
                    lines,
                }
            })
            .collect())
    }
}

// ============================================================================
// Date range helpers
// ============================================================================

/// Midnight UTC at the start of the given date.
fn day_start(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Exclusive upper bound that covers the whole of `date`.
///
/// Returns `None` only at the end of the calendar, in which case the filter
/// is simply skipped.
fn day_end_exclusive(date: NaiveDate) -> Option<chrono::DateTime<Utc>> {
    date.succ_opt().map(day_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_start_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(day_start(date).to_rfc3339(), "2026-03-15T00:00:00+00:00");
    }

    #[test]
    fn test_day_end_covers_whole_day() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let end = day_end_exclusive(date).unwrap();
        assert_eq!(end.to_rfc3339(), "2026-03-16T00:00:00+00:00");

        // A timestamp late on the filtered day is inside the bound
        let late = NaiveDate::from_ymd_opt(2026, 3, 15)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap()
            .and_utc();
        assert!(late < end);
    }

    #[test]
    fn test_day_end_none_at_calendar_end() {
        assert!(day_end_exclusive(NaiveDate::MAX).is_none());
    }
}
