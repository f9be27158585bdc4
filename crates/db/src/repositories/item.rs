//! Item repository for inventory catalog operations.
//!
//! Items are unique by name within a company. Stock is only ever changed
//! through signed deltas applied by the transaction repository, so the stored
//! level always equals the sum of the surviving transaction history plus the
//! opening stock.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use vypar_shared::types::CompanyScope;

use crate::entities::items;

/// Error types for item operations.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Item not found.
    #[error("Item not found: {0}")]
    NotFound(Uuid),

    /// An item with the same name already exists in the company.
    #[error("An item with the name \"{0}\" already exists.")]
    DuplicateName(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    /// Item name, unique within the company.
    pub name: String,
    /// Default selling rate.
    pub sale_price: Decimal,
    /// Default purchase rate.
    pub purchase_price: Decimal,
    /// Opening stock (units).
    pub stock: i64,
    /// GST rate percentage (0-100).
    pub gst_rate: Decimal,
    /// HSN/SAC classification code.
    pub hsn_code: Option<String>,
}

/// Item repository for catalog CRUD and stock adjustments.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    db: DatabaseConnection,
}

impl ItemRepository {
    /// Creates a new item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists all items for a company, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, scope: &CompanyScope) -> Result<Vec<items::Model>, ItemError> {
        let items = items::Entity::find()
            .filter(items::Column::CompanyCode.eq(scope.company_code()))
            .order_by_asc(items::Column::Name)
            .all(&self.db)
            .await?;

        Ok(items)
    }

    /// Gets an item by ID within a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the item does not exist in this company.
    pub async fn find_by_id(
        &self,
        scope: &CompanyScope,
        item_id: Uuid,
    ) -> Result<items::Model, ItemError> {
        items::Entity::find_by_id(item_id)
            .filter(items::Column::CompanyCode.eq(scope.company_code()))
            .one(&self.db)
            .await?
            .ok_or(ItemError::NotFound(item_id))
    }

    /// Creates a new item.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if an item with the same name already exists
    /// in this company.
    pub async fn create(
        &self,
        scope: &CompanyScope,
        input: CreateItemInput,
    ) -> Result<items::Model, ItemError> {
        let now = Utc::now().into();

        let item = items::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_code: Set(scope.company_code().to_owned()),
            name: Set(input.name.clone()),
            sale_price: Set(input.sale_price),
            purchase_price: Set(input.purchase_price),
            stock: Set(input.stock),
            gst_rate: Set(input.gst_rate),
            hsn_code: Set(input.hsn_code),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match item.insert(&self.db).await {
            Ok(model) => Ok(model),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(ItemError::DuplicateName(input.name))
                }
                _ => Err(ItemError::Database(e)),
            },
        }
    }

    /// Resolves an item by name, creating it if absent, inside the caller's
    /// transaction.
    ///
    /// A created item is seeded with the line's rate as both sale and
    /// purchase price, zero stock, and a zero GST rate. The upsert form makes
    /// concurrent resolution of the same name converge on one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn resolve_or_create_in<C: ConnectionTrait>(
        conn: &C,
        scope: &CompanyScope,
        name: &str,
        rate: Decimal,
    ) -> Result<items::Model, DbErr> {
        let now = Utc::now().into();

        let item = items::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_code: Set(scope.company_code().to_owned()),
            name: Set(name.to_owned()),
            sale_price: Set(rate),
            purchase_price: Set(rate),
            stock: Set(0),
            gst_rate: Set(Decimal::ZERO),
            hsn_code: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // No-op update on conflict so RETURNING yields the existing row
        items::Entity::insert(item)
            .on_conflict(
                OnConflict::columns([items::Column::CompanyCode, items::Column::Name])
                    .update_column(items::Column::Name)
                    .to_owned(),
            )
            .exec_with_returning(conn)
            .await
    }

    /// Applies a signed stock delta to an item inside the caller's
    /// transaction.
    ///
    /// The increment happens in SQL, not read-modify-write, so concurrent
    /// postings against the same item cannot lose updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn adjust_stock_in<C: ConnectionTrait>(
        conn: &C,
        item_id: Uuid,
        delta: i64,
    ) -> Result<(), DbErr> {
        items::Entity::update_many()
            .col_expr(
                items::Column::Stock,
                Expr::col(items::Column::Stock).add(delta),
            )
            .col_expr(items::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(items::Column::Id.eq(item_id))
            .exec(conn)
            .await?;

        Ok(())
    }
}
