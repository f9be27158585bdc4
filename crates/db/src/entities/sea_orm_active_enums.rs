//! Database enum types.
//!
//! String values mirror the wire names used by the API so that stored values
//! and JSON payloads never need a translation table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use vypar_core::posting;

/// Commercial transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    /// Sale invoice.
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Purchase bill.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Customer return.
    #[sea_orm(string_value = "saleReturn")]
    SaleReturn,
    /// Return to supplier.
    #[sea_orm(string_value = "purchaseReturn")]
    PurchaseReturn,
    /// Quotation.
    #[sea_orm(string_value = "estimate")]
    Estimate,
    /// Sale order.
    #[sea_orm(string_value = "saleOrder")]
    SaleOrder,
    /// Purchase order.
    #[sea_orm(string_value = "purchaseOrder")]
    PurchaseOrder,
    /// Incoming payment.
    #[sea_orm(string_value = "paymentIn")]
    PaymentIn,
    /// Outgoing payment.
    #[sea_orm(string_value = "paymentOut")]
    PaymentOut,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Transaction document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
pub enum TransactionStatus {
    /// Freshly created.
    #[sea_orm(string_value = "Draft")]
    Draft,
    /// Sent to the party.
    #[sea_orm(string_value = "Sent")]
    Sent,
    /// Viewed by the party.
    #[sea_orm(string_value = "Viewed")]
    Viewed,
    /// Accepted by the party.
    #[sea_orm(string_value = "Accepted")]
    Accepted,
    /// Rejected by the party.
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    /// Converted to an invoice.
    #[sea_orm(string_value = "Invoiced")]
    Invoiced,
}

/// Party classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_type")]
pub enum PartyType {
    /// Buys from the company.
    #[sea_orm(string_value = "customer")]
    Customer,
    /// Sells to the company.
    #[sea_orm(string_value = "supplier")]
    Supplier,
}

impl From<posting::TransactionType> for TransactionType {
    fn from(value: posting::TransactionType) -> Self {
        match value {
            posting::TransactionType::Sale => Self::Sale,
            posting::TransactionType::Purchase => Self::Purchase,
            posting::TransactionType::SaleReturn => Self::SaleReturn,
            posting::TransactionType::PurchaseReturn => Self::PurchaseReturn,
            posting::TransactionType::Estimate => Self::Estimate,
            posting::TransactionType::SaleOrder => Self::SaleOrder,
            posting::TransactionType::PurchaseOrder => Self::PurchaseOrder,
            posting::TransactionType::PaymentIn => Self::PaymentIn,
            posting::TransactionType::PaymentOut => Self::PaymentOut,
            posting::TransactionType::Expense => Self::Expense,
        }
    }
}

impl From<TransactionType> for posting::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Sale => Self::Sale,
            TransactionType::Purchase => Self::Purchase,
            TransactionType::SaleReturn => Self::SaleReturn,
            TransactionType::PurchaseReturn => Self::PurchaseReturn,
            TransactionType::Estimate => Self::Estimate,
            TransactionType::SaleOrder => Self::SaleOrder,
            TransactionType::PurchaseOrder => Self::PurchaseOrder,
            TransactionType::PaymentIn => Self::PaymentIn,
            TransactionType::PaymentOut => Self::PaymentOut,
            TransactionType::Expense => Self::Expense,
        }
    }
}

impl From<posting::TransactionStatus> for TransactionStatus {
    fn from(value: posting::TransactionStatus) -> Self {
        match value {
            posting::TransactionStatus::Draft => Self::Draft,
            posting::TransactionStatus::Sent => Self::Sent,
            posting::TransactionStatus::Viewed => Self::Viewed,
            posting::TransactionStatus::Accepted => Self::Accepted,
            posting::TransactionStatus::Rejected => Self::Rejected,
            posting::TransactionStatus::Invoiced => Self::Invoiced,
        }
    }
}

impl From<TransactionStatus> for posting::TransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Draft => Self::Draft,
            TransactionStatus::Sent => Self::Sent,
            TransactionStatus::Viewed => Self::Viewed,
            TransactionStatus::Accepted => Self::Accepted,
            TransactionStatus::Rejected => Self::Rejected,
            TransactionStatus::Invoiced => Self::Invoiced,
        }
    }
}
