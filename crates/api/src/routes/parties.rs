//! Party (customer/supplier) routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthCompany};
use vypar_db::entities::{parties, sea_orm_active_enums::PartyType};
use vypar_db::repositories::{CreatePartyInput, PartyError, PartyRepository};

/// Creates the party routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/parties", get(list_parties))
        .route("/parties", post(create_party))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing parties.
#[derive(Debug, Deserialize)]
pub struct ListPartiesQuery {
    /// Filter by party type (`customer` or `supplier`).
    #[serde(rename = "type")]
    pub party_type: Option<String>,
}

/// Request body for creating a party.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePartyRequest {
    /// Party name, unique within the company.
    pub name: String,
    /// `customer` or `supplier`.
    #[serde(rename = "type")]
    pub party_type: String,
    /// GST identification number.
    pub gstin: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Billing address.
    pub billing_address: Option<String>,
    /// Opening receivable/payable balance.
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Response body for a party.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyResponse {
    /// Party ID.
    pub id: Uuid,
    /// Party name.
    pub name: String,
    /// `customer` or `supplier`.
    #[serde(rename = "type")]
    pub party_type: String,
    /// GST identification number.
    pub gstin: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Billing address.
    pub billing_address: Option<String>,
    /// Opening balance.
    pub opening_balance: Decimal,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<parties::Model> for PartyResponse {
    fn from(party: parties::Model) -> Self {
        Self {
            id: party.id,
            name: party.name,
            party_type: match party.party_type {
                PartyType::Customer => "customer".to_string(),
                PartyType::Supplier => "supplier".to_string(),
            },
            gstin: party.gstin,
            phone: party.phone,
            email: party.email,
            billing_address: party.billing_address,
            opening_balance: party.opening_balance,
            created_at: party.created_at.to_rfc3339(),
            updated_at: party.updated_at.to_rfc3339(),
        }
    }
}

/// Parses a party type wire name.
fn parse_party_type(s: &str) -> Option<PartyType> {
    match s {
        "customer" => Some(PartyType::Customer),
        "supplier" => Some(PartyType::Supplier),
        _ => None,
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/parties?type=` - List parties, optionally by type.
async fn list_parties(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Query(query): Query<ListPartiesQuery>,
) -> impl IntoResponse {
    let party_type = match query.party_type.as_deref() {
        None => None,
        Some(s) => match parse_party_type(s) {
            Some(pt) => Some(pt),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_party_type",
                        "message": format!("Invalid party type: {s}")
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = PartyRepository::new((*state.db).clone());
    match repo.list(&scope, party_type).await {
        Ok(parties) => {
            let parties: Vec<PartyResponse> =
                parties.into_iter().map(PartyResponse::from).collect();
            (StatusCode::OK, Json(json!({ "parties": parties }))).into_response()
        }
        Err(e) => party_error_response(e),
    }
}

/// POST `/parties` - Create a new party.
async fn create_party(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Json(payload): Json<CreatePartyRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "message": "Party name is required."
            })),
        )
            .into_response();
    }
    let Some(party_type) = parse_party_type(&payload.party_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_party_type",
                "message": format!("Invalid party type: {}", payload.party_type)
            })),
        )
            .into_response();
    };

    let repo = PartyRepository::new((*state.db).clone());
    let input = CreatePartyInput {
        name: payload.name.trim().to_string(),
        party_type,
        gstin: payload.gstin,
        phone: payload.phone,
        email: payload.email,
        billing_address: payload.billing_address,
        opening_balance: payload.opening_balance,
    };

    match repo.create(&scope, input).await {
        Ok(party) => (StatusCode::CREATED, Json(PartyResponse::from(party))).into_response(),
        Err(e) => party_error_response(e),
    }
}

/// Maps party repository errors to HTTP responses.
fn party_error_response(e: PartyError) -> Response {
    match e {
        PartyError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "party_not_found",
                "message": format!("Party not found: {id}")
            })),
        )
            .into_response(),
        PartyError::DuplicateName(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_party_name",
                "message": e.to_string()
            })),
        )
            .into_response(),
        PartyError::Database(err) => {
            error!(error = %err, "party operation failed");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_party_type() {
        assert_eq!(parse_party_type("customer"), Some(PartyType::Customer));
        assert_eq!(parse_party_type("supplier"), Some(PartyType::Supplier));
        assert_eq!(parse_party_type("vendor"), None);
    }

    #[test]
    fn test_duplicate_message_names_the_party() {
        let e = PartyError::DuplicateName("Sharma Traders".to_string());
        assert_eq!(
            e.to_string(),
            "A party with the name \"Sharma Traders\" already exists."
        );
    }

    #[test]
    fn test_create_request_rejects_unknown_fields() {
        let result: Result<CreatePartyRequest, _> = serde_json::from_str(
            r#"{"name":"Sharma Traders","type":"customer","creditLimit":"5000"}"#,
        );
        assert!(result.is_err());
    }
}
