//! Inventory item routes.

use axum::{
    Json, Router,
    extract::State,
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
use vypar_db::entities::items;
use vypar_db::repositories::{CreateItemInput, ItemError, ItemRepository};

/// Creates the item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items))
        .route("/items", post(create_item))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an item.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateItemRequest {
    /// Item name, unique within the company.
    pub name: String,
    /// Default selling rate.
    #[serde(default)]
    pub sale_price: Decimal,
    /// Default purchase rate.
    #[serde(default)]
    pub purchase_price: Decimal,
    /// Opening stock (units).
    #[serde(default)]
    pub stock: i64,
    /// GST rate percentage (0-100).
    #[serde(default)]
    pub gst_rate: Decimal,
    /// HSN/SAC classification code.
    pub hsn_code: Option<String>,
}

/// Response body for an item.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Item name.
    pub name: String,
    /// Default selling rate.
    pub sale_price: Decimal,
    /// Default purchase rate.
    pub purchase_price: Decimal,
    /// Current stock (units).
    pub stock: i64,
    /// GST rate percentage.
    pub gst_rate: Decimal,
    /// HSN/SAC code.
    pub hsn_code: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<items::Model> for ItemResponse {
    fn from(item: items::Model) -> Self {
        Self {
            id: item.id,
            name: item.name,
            sale_price: item.sale_price,
            purchase_price: item.purchase_price,
            stock: item.stock,
            gst_rate: item.gst_rate,
            hsn_code: item.hsn_code,
            created_at: item.created_at.to_rfc3339(),
            updated_at: item.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/items` - List all items for the company.
async fn list_items(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
) -> impl IntoResponse {
    let repo = ItemRepository::new((*state.db).clone());

    match repo.list(&scope).await {
        Ok(items) => {
            let items: Vec<ItemResponse> = items.into_iter().map(ItemResponse::from).collect();
            (StatusCode::OK, Json(json!({ "items": items }))).into_response()
        }
        Err(e) => item_error_response(e),
    }
}

/// POST `/items` - Create a new item.
async fn create_item(
    State(state): State<AppState>,
    AuthCompany(scope): AuthCompany,
    Json(payload): Json<CreateItemRequest>,
) -> impl IntoResponse {
    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_fields",
                "message": "Item name is required."
            })),
        )
            .into_response();
    }

    let repo = ItemRepository::new((*state.db).clone());
    let input = CreateItemInput {
        name: payload.name.trim().to_string(),
        sale_price: payload.sale_price,
        purchase_price: payload.purchase_price,
        stock: payload.stock,
        gst_rate: payload.gst_rate,
        hsn_code: payload.hsn_code,
    };

    match repo.create(&scope, input).await {
        Ok(item) => (StatusCode::CREATED, Json(ItemResponse::from(item))).into_response(),
        Err(e) => item_error_response(e),
    }
}

/// Maps item repository errors to HTTP responses.
fn item_error_response(e: ItemError) -> Response {
    match e {
        ItemError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "item_not_found",
                "message": format!("Item not found: {id}")
            })),
        )
            .into_response(),
        ItemError::DuplicateName(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_item_name",
                "message": e.to_string()
            })),
        )
            .into_response(),
        ItemError::Database(err) => {
            error!(error = %err, "item operation failed");
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
