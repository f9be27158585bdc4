//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{TransactionStatus, TransactionType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_code: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub transaction_number: String,
    pub party_id: Option<Uuid>,
    /// GSTIN snapshot taken from the party at posting time.
    pub party_gstin: Option<String>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub balance_due: Decimal,
    pub transaction_date: DateTimeWithTimeZone,
    /// Source estimate when this document was produced by conversion.
    pub converted_from: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parties::Entity",
        from = "Column::PartyId",
        to = "super::parties::Column::Id"
    )]
    Parties,
    #[sea_orm(has_many = "super::transaction_lines::Entity")]
    TransactionLines,
    // Self-reference from a converted invoice back to its source estimate.
    // Deleting the source clears the link rather than blocking the delete.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ConvertedFrom",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    SourceTransaction,
}

impl Related<super::parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl Related<super::transaction_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
