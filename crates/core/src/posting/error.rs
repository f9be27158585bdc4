//! Posting error types for validation and state errors.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during posting validation and resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostingError {
    // ========== Validation Errors ==========
    /// A required field is missing from the request.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Line item carries neither an existing item id nor a name.
    #[error("Item data is malformed: a line must reference an existing item id or carry a name")]
    MalformedLine,

    /// Line quantity must be positive.
    #[error("Line quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// Line rate cannot be negative.
    #[error("Line rate cannot be negative")]
    NegativeRate,

    /// Unknown transaction type name.
    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(String),

    /// Unknown transaction status name.
    #[error("Invalid transaction status: {0}")]
    InvalidStatus(String),

    // ========== Reference Errors ==========
    /// Referenced item does not exist.
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),

    /// Referenced party does not exist.
    #[error("Party not found: {0}")]
    PartyNotFound(Uuid),

    // ========== Conversion Errors ==========
    /// Only estimates can be converted to invoices.
    #[error("Only estimates (quotations) can be converted to invoices")]
    NotAnEstimate,

    /// The estimate has already been converted.
    #[error("This quotation has already been converted to an invoice")]
    AlreadyInvoiced,
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::MalformedLine => "MALFORMED_LINE",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::NegativeRate => "NEGATIVE_RATE",
            Self::InvalidTransactionType(_) => "INVALID_TRANSACTION_TYPE",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::PartyNotFound(_) => "PARTY_NOT_FOUND",
            Self::NotAnEstimate => "NOT_AN_ESTIMATE",
            Self::AlreadyInvoiced => "ALREADY_INVOICED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::MissingField(_)
            | Self::MalformedLine
            | Self::InvalidQuantity(_)
            | Self::NegativeRate
            | Self::InvalidTransactionType(_)
            | Self::InvalidStatus(_)
            | Self::NotAnEstimate => 400,

            Self::ItemNotFound(_) | Self::PartyNotFound(_) => 404,

            // Double conversion is a conflict, not a validation failure
            Self::AlreadyInvoiced => 409,
        }
    }
}
