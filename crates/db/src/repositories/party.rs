//! Party repository for customer and supplier records.
//!
//! Parties are unique by name within a company. The GSTIN stored here drives
//! the CGST/SGST vs IGST decision when transactions are posted.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use vypar_shared::types::CompanyScope;

use crate::entities::{parties, sea_orm_active_enums::PartyType};

/// Error types for party operations.
#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    /// Party not found.
    #[error("Party not found: {0}")]
    NotFound(Uuid),

    /// A party with the same name already exists in the company.
    #[error("A party with the name \"{0}\" already exists.")]
    DuplicateName(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a party.
#[derive(Debug, Clone)]
pub struct CreatePartyInput {
    /// Party name, unique within the company.
    pub name: String,
    /// Customer or supplier.
    pub party_type: PartyType,
    /// GST identification number; first two characters encode the state.
    pub gstin: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Billing address.
    pub billing_address: Option<String>,
    /// Opening receivable/payable balance.
    pub opening_balance: Decimal,
}

/// Party repository for customer/supplier CRUD.
#[derive(Debug, Clone)]
pub struct PartyRepository {
    db: DatabaseConnection,
}

impl PartyRepository {
    /// Creates a new party repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists parties for a company, optionally filtered by type, ordered by
    /// name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        scope: &CompanyScope,
        party_type: Option<PartyType>,
    ) -> Result<Vec<parties::Model>, PartyError> {
        let mut query = parties::Entity::find()
            .filter(parties::Column::CompanyCode.eq(scope.company_code()));

        if let Some(pt) = party_type {
            query = query.filter(parties::Column::PartyType.eq(pt));
        }

        let parties = query
            .order_by_asc(parties::Column::Name)
            .all(&self.db)
            .await?;

        Ok(parties)
    }

    /// Gets a party by ID within a company.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the party does not exist in this company.
    pub async fn find_by_id(
        &self,
        scope: &CompanyScope,
        party_id: Uuid,
    ) -> Result<parties::Model, PartyError> {
        parties::Entity::find_by_id(party_id)
            .filter(parties::Column::CompanyCode.eq(scope.company_code()))
            .one(&self.db)
            .await?
            .ok_or(PartyError::NotFound(party_id))
    }

    /// Creates a new party.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if a party with the same name already exists
    /// in this company.
    pub async fn create(
        &self,
        scope: &CompanyScope,
        input: CreatePartyInput,
    ) -> Result<parties::Model, PartyError> {
        let now = Utc::now().into();

        let party = parties::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_code: Set(scope.company_code().to_owned()),
            name: Set(input.name.clone()),
            party_type: Set(input.party_type),
            gstin: Set(input.gstin),
            phone: Set(input.phone),
            email: Set(input.email),
            billing_address: Set(input.billing_address),
            opening_balance: Set(input.opening_balance),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match party.insert(&self.db).await {
            Ok(model) => Ok(model),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(PartyError::DuplicateName(input.name))
                }
                _ => Err(PartyError::Database(e)),
            },
        }
    }
}
