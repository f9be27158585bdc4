//! Transaction routes: posting, querying, deletion, and conversion.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthCompany};
use vypar_core::posting::{
    LineInput, PostingError, TransactionStatus, TransactionType,
};
use vypar_db::repositories::{
    CreateTransactionInput, SequenceRepository, TransactionError, TransactionFilter,
    TransactionRepository, TransactionView, UpdateTransactionInput,
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/next-number/{type}", get(next_number))
        .route(
            "/transactions/{id}",
            get(get_transaction).put(update_transaction).delete(delete_transaction),
        )
        .route("/transactions/{id}/convert", post(convert_transaction))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// Comma-separated transaction types.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Filter by party.
    pub party_id: Option<Uuid>,
    /// Inclusive start date (YYYY-MM-DD).
    pub start_date: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD); the whole day is covered.
    pub end_date: Option<NaiveDate>,
}

/// Request body for one transaction line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LineRequest {
    /// Existing item reference.
    pub item: Option<Uuid>,
    /// Item name; resolves-or-creates when no id is given.
    pub name: Option<String>,
    /// Quantity (units).
    pub quantity: i64,
    /// Per-unit rate.
    pub rate: Decimal,
}

/// Request body for posting a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTransactionRequest {
    /// Transaction type wire name.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Document number, from the next-number endpoint.
    pub transaction_number: Option<String>,
    /// Grand total.
    pub total_amount: Option<Decimal>,
    /// Initial status; defaults to Draft.
    pub status: Option<String>,
    /// Party reference.
    pub party_id: Option<Uuid>,
    /// Document date; defaults to now.
    pub transaction_date: Option<DateTime<Utc>>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<LineRequest>,
    /// Document-level discount.
    #[serde(default)]
    pub discount: Decimal,
    /// Amount settled at posting time.
    #[serde(default)]
    pub amount_paid: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for updating a transaction's header fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTransactionRequest {
    /// New status.
    pub status: Option<String>,
    /// New document date.
    pub transaction_date: Option<DateTime<Utc>>,
    /// New discount.
    pub discount: Option<Decimal>,
    /// New grand total.
    pub total_amount: Option<Decimal>,
    /// New settled amount.
    pub amount_paid: Option<Decimal>,
    /// New notes.
    pub notes: Option<String>,
}

/// Response body for a transaction line.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    /// Referenced item.
    pub item: Uuid,
    /// Item display name.
    pub name: String,
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

/// Response body for a transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Transaction type wire name.
    #[serde(rename = "type")]
    pub transaction_type: &'static str,
    /// Status wire name.
    pub status: &'static str,
    /// Document number.
    pub transaction_number: String,
    /// Party reference.
    pub party_id: Option<Uuid>,
    /// Party display name.
    pub party_name: Option<String>,
    /// Party GSTIN snapshot.
    pub party_gstin: Option<String>,
    /// Line items.
    pub items: Vec<LineResponse>,
    /// Sum of taxable values.
    pub subtotal: Decimal,
    /// Document-level discount.
    pub discount: Decimal,
    /// Grand total.
    pub total_amount: Decimal,
    /// Amount settled.
    pub amount_paid: Decimal,
    /// Outstanding amount.
    pub balance_due: Decimal,
    /// Document date.
    pub transaction_date: String,
    /// Source estimate for converted invoices.
    pub converted_from: Option<Uuid>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<TransactionView> for TransactionResponse {
    fn from(view: TransactionView) -> Self {
        let t = view.transaction;
        let transaction_type: TransactionType = t.transaction_type.into();
        let status: TransactionStatus = t.status.into();
        Self {
            id: t.id,
            transaction_type: transaction_type.as_str(),
            status: status.as_str(),
            transaction_number: t.transaction_number,
            party_id: t.party_id,
            party_name: view.party_name,
            party_gstin: t.party_gstin,
            items: view
                .lines
                .into_iter()
                .map(|lv| LineResponse {
                    item: lv.line.item_id,
                    name: lv.item_name,
                    quantity: lv.line.quantity,
                    rate: lv.line.rate,
                    gst_rate: lv.line.gst_rate,
                    hsn_code: lv.line.hsn_code,
                    taxable_value: lv.line.taxable_value,
                    cgst: lv.line.cgst,
                    sgst: lv.line.sgst,
                    igst: lv.line.igst,
                })
                .collect(),
            subtotal: t.subtotal,
            discount: t.discount,
            total_amount: t.total_amount,
            amount_paid: t.amount_paid,
            balance_due: t.balance_due,
            transaction_date: t.transaction_date.to_rfc3339(),
            converted_from: t.converted_from,
            notes: t.notes,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps a posting rule violation to an HTTP response.
fn posting_error_response(e: &PostingError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::BAD_REQUEST);
    (
        status,
        Json(json!({
            "error": e.error_code().to_lowercase(),
            "message": e.to_string()
        })),
    )
        .into_response()
}

/// Maps transaction repository errors to HTTP responses.
fn transaction_error_response(e: TransactionError) -> Response {
    match e {
        TransactionError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "transaction_not_found",
                "message": format!("Transaction not found: {id}")
            })),
        )
            .into_response(),
        TransactionError::Posting(pe) => posting_error_response(&pe),
        TransactionError::DuplicateNumber(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_transaction_number",
                "message": e.to_string()
            })),
        )
            .into_response(),
        TransactionError::Database(err) => {
            error!(error = %err, "transaction operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/transactions` - Post a new transaction.
async fn create_transaction(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    let (Some(type_name), Some(total_amount), Some(transaction_number)) = (
        payload.transaction_type,
        payload.total_amount,
        payload.transaction_number,
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "message": "Missing required fields: type, totalAmount, and transactionNumber are required."
            })),
        )
            .into_response();
    };

    let transaction_type = match TransactionType::parse(&type_name) {
        Ok(tt) => tt,
        Err(e) => return posting_error_response(&e),
    };
    let status = match payload.status.as_deref() {
        None => TransactionStatus::default(),
        Some(s) => match TransactionStatus::parse(s) {
            Ok(status) => status,
            Err(e) => return posting_error_response(&e),
        },
    };

    let lines: Vec<LineInput> = payload
        .items
        .into_iter()
        .map(|line| LineInput {
            item_id: line.item,
            name: line.name,
            quantity: line.quantity,
            rate: line.rate,
        })
        .collect();

    let input = CreateTransactionInput {
        transaction_type,
        transaction_number,
        status,
        party_id: payload.party_id,
        transaction_date: payload.transaction_date.map(Into::into),
        lines,
        discount: payload.discount,
        total_amount,
        amount_paid: payload.amount_paid,
        notes: payload.notes,
    };

    let repo = TransactionRepository::new((*state.db).clone());
    match repo
        .create_transaction(&scope, state.company_state_code.as_deref(), input)
        .await
    {
        Ok(view) => {
            info!(
                company = %scope,
                transaction_id = %view.transaction.id,
                "transaction created"
            );
            (StatusCode::CREATED, Json(TransactionResponse::from(view))).into_response()
        }
        Err(e) => transaction_error_response(e),
    }
}

/// GET `/transactions` - List transactions with filters, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let mut types = Vec::new();
    if let Some(raw) = query.transaction_type.as_deref() {
        for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match TransactionType::parse(name) {
                Ok(tt) => types.push(tt),
                Err(e) => return posting_error_response(&e),
            }
        }
    }

    let filter = TransactionFilter {
        types,
        party_id: query.party_id,
        date_from: query.start_date,
        date_to: query.end_date,
    };

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.list_transactions(&scope, filter).await {
        Ok(views) => {
            let transactions: Vec<TransactionResponse> =
                views.into_iter().map(TransactionResponse::from).collect();
            (StatusCode::OK, Json(json!({ "transactions": transactions }))).into_response()
        }
        Err(e) => transaction_error_response(e),
    }
}

/// GET `/transactions/{id}` - Get a single transaction.
async fn get_transaction(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());
    match repo.get_transaction(&scope, id).await {
        Ok(view) => (StatusCode::OK, Json(TransactionResponse::from(view))).into_response(),
        Err(e) => transaction_error_response(e),
    }
}

/// PUT `/transactions/{id}` - Update header fields.
async fn update_transaction(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> impl IntoResponse {
    let status = match payload.status.as_deref() {
        None => None,
        Some(s) => match TransactionStatus::parse(s) {
            Ok(status) => Some(status),
            Err(e) => return posting_error_response(&e),
        },
    };

    let input = UpdateTransactionInput {
        status,
        transaction_date: payload.transaction_date.map(Into::into),
        discount: payload.discount,
        total_amount: payload.total_amount,
        amount_paid: payload.amount_paid,
        notes: payload.notes,
    };

    let repo = TransactionRepository::new((*state.db).clone());
    match repo.update_transaction(&scope, id, input).await {
        Ok(view) => (StatusCode::OK, Json(TransactionResponse::from(view))).into_response(),
        Err(e) => transaction_error_response(e),
    }
}

/// DELETE `/transactions/{id}` - Delete a transaction, reversing stock.
async fn delete_transaction(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());
    match repo.delete_transaction(&scope, id).await {
        Ok(()) => {
            info!(company = %scope, transaction_id = %id, "transaction deleted");
            (
                StatusCode::OK,
                Json(json!({ "message": "Transaction removed successfully" })),
            )
                .into_response()
        }
        Err(e) => transaction_error_response(e),
    }
}

/// POST `/transactions/{id}/convert` - Convert an estimate to a sale invoice.
async fn convert_transaction(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());
    match repo.convert_to_invoice(&scope, id).await {
        Ok(view) => {
            info!(
                company = %scope,
                estimate_id = %id,
                invoice_id = %view.transaction.id,
                "estimate converted"
            );
            (StatusCode::CREATED, Json(TransactionResponse::from(view))).into_response()
        }
        Err(e) => transaction_error_response(e),
    }
}

/// GET `/transactions/next-number/{type}` - Reserve the next document number.
///
/// Reservation is atomic; a reserved number is never handed out twice, and
/// numbers abandoned by the client simply leave gaps.
async fn next_number(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Path(type_name): Path<String>,
) -> impl IntoResponse {
    let transaction_type = match TransactionType::parse(&type_name) {
        Ok(tt) => tt,
        Err(e) => return posting_error_response(&e),
    };

    let repo = SequenceRepository::new((*state.db).clone());
    match repo.next_number(&scope, transaction_type).await {
        Ok(n) => (StatusCode::OK, Json(json!({ "nextNumber": n }))).into_response(),
        Err(e) => {
            error!(error = %e, "failed to reserve document number");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}
