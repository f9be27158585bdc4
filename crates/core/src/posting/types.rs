//! Domain types for transaction posting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PostingError;

/// Commercial transaction type.
///
/// String forms are the camelCase wire names used by clients
/// (`sale`, `purchaseReturn`, `paymentIn`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionType {
    /// Sale invoice (stock out).
    Sale,
    /// Purchase bill (stock in).
    Purchase,
    /// Customer returns goods (stock in).
    SaleReturn,
    /// Goods returned to supplier (stock out).
    PurchaseReturn,
    /// Quotation; convertible to a sale invoice.
    Estimate,
    /// Confirmed sale order, not yet fulfilled.
    SaleOrder,
    /// Confirmed purchase order, not yet received.
    PurchaseOrder,
    /// Money received.
    PaymentIn,
    /// Money paid out.
    PaymentOut,
    /// Business expense.
    Expense,
}

/// How a transaction type affects item stock levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Line quantities are subtracted from stock.
    Decrease,
    /// Line quantities are added to stock.
    Increase,
    /// Stock is not touched.
    None,
}

impl TransactionType {
    /// All transaction types.
    pub const ALL: [Self; 10] = [
        Self::Sale,
        Self::Purchase,
        Self::SaleReturn,
        Self::PurchaseReturn,
        Self::Estimate,
        Self::SaleOrder,
        Self::PurchaseOrder,
        Self::PaymentIn,
        Self::PaymentOut,
        Self::Expense,
    ];

    /// Returns the wire name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::SaleReturn => "saleReturn",
            Self::PurchaseReturn => "purchaseReturn",
            Self::Estimate => "estimate",
            Self::SaleOrder => "saleOrder",
            Self::PurchaseOrder => "purchaseOrder",
            Self::PaymentIn => "paymentIn",
            Self::PaymentOut => "paymentOut",
            Self::Expense => "expense",
        }
    }

    /// Parses a wire name into a transaction type.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InvalidTransactionType` for unknown names.
    pub fn parse(s: &str) -> Result<Self, PostingError> {
        match s {
            "sale" => Ok(Self::Sale),
            "purchase" => Ok(Self::Purchase),
            "saleReturn" => Ok(Self::SaleReturn),
            "purchaseReturn" => Ok(Self::PurchaseReturn),
            "estimate" => Ok(Self::Estimate),
            "saleOrder" => Ok(Self::SaleOrder),
            "purchaseOrder" => Ok(Self::PurchaseOrder),
            "paymentIn" => Ok(Self::PaymentIn),
            "paymentOut" => Ok(Self::PaymentOut),
            "expense" => Ok(Self::Expense),
            other => Err(PostingError::InvalidTransactionType(other.to_string())),
        }
    }

    /// Returns how this transaction type affects stock when posted.
    ///
    /// Sales and purchase returns move goods out; purchases and sale returns
    /// move goods in. Estimates, orders, payments, and expenses represent
    /// unfulfilled or non-inventory events and never touch stock.
    #[must_use]
    pub const fn stock_direction(self) -> StockDirection {
        match self {
            Self::Sale | Self::PurchaseReturn => StockDirection::Decrease,
            Self::Purchase | Self::SaleReturn => StockDirection::Increase,
            Self::Estimate
            | Self::SaleOrder
            | Self::PurchaseOrder
            | Self::PaymentIn
            | Self::PaymentOut
            | Self::Expense => StockDirection::None,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction document status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Freshly created, editable.
    #[default]
    Draft,
    /// Sent to the party.
    Sent,
    /// Viewed by the party.
    Viewed,
    /// Accepted by the party.
    Accepted,
    /// Rejected by the party.
    Rejected,
    /// Estimate converted to an invoice (terminal for estimates).
    Invoiced,
}

impl TransactionStatus {
    /// Returns the wire name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Sent => "Sent",
            Self::Viewed => "Viewed",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
            Self::Invoiced => "Invoiced",
        }
    }

    /// Parses a wire name into a status.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InvalidStatus` for unknown names.
    pub fn parse(s: &str) -> Result<Self, PostingError> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Sent" => Ok(Self::Sent),
            "Viewed" => Ok(Self::Viewed),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            "Invoiced" => Ok(Self::Invoiced),
            other => Err(PostingError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested line item, as supplied by the client.
///
/// A line must carry either an existing item id or a name for a new item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LineInput {
    /// Existing item reference.
    pub item_id: Option<Uuid>,
    /// Item name, used to resolve-or-create when no id is given.
    pub name: Option<String>,
    /// Quantity (units).
    pub quantity: i64,
    /// Per-unit rate.
    pub rate: Decimal,
}

/// Catalog fields of a resolved item, snapshotted onto lines at posting time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Item ID.
    pub id: Uuid,
    /// GST rate percentage (0-100) at posting time.
    pub gst_rate: Decimal,
    /// HSN/SAC classification code at posting time.
    pub hsn_code: Option<String>,
}

/// A line item with resolved item reference and computed tax fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedLine {
    /// Resolved item ID.
    pub item_id: Uuid,
    /// Quantity (units).
    pub quantity: i64,
    /// Per-unit rate.
    pub rate: Decimal,
    /// GST rate snapshot.
    pub gst_rate: Decimal,
    /// HSN code snapshot.
    pub hsn_code: Option<String>,
    /// `quantity x rate`.
    pub taxable_value: Decimal,
    /// Central GST component.
    pub cgst: Decimal,
    /// State GST component.
    pub sgst: Decimal,
    /// Integrated GST component.
    pub igst: Decimal,
}

impl EnrichedLine {
    /// Total tax carried by this line.
    #[must_use]
    pub fn total_tax(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }
}
