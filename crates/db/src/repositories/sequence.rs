//! Sequence repository for atomic document number generation.
//!
//! Each company keeps one counter row per transaction type. Numbers are
//! reserved with a single `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`
//! so concurrent callers can never observe the same value.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set};

use vypar_core::posting::TransactionType;
use vypar_shared::types::CompanyScope;

use crate::entities::sequences;

/// Sequence repository for document number counters.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reserves and returns the next document number for a transaction type.
    ///
    /// Reserved numbers are never reissued, even if the caller discards them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn next_number(
        &self,
        scope: &CompanyScope,
        transaction_type: TransactionType,
    ) -> Result<i64, DbErr> {
        Self::next_number_in(&self.db, scope, transaction_type).await
    }

    /// Reserves the next document number inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn next_number_in<C: ConnectionTrait>(
        conn: &C,
        scope: &CompanyScope,
        transaction_type: TransactionType,
    ) -> Result<i64, DbErr> {
        let counter = sequences::Entity::insert(sequences::ActiveModel {
            key: Set(sequence_key(scope, transaction_type)),
            value: Set(1),
        })
        .on_conflict(
            OnConflict::column(sequences::Column::Key)
                .value(
                    sequences::Column::Value,
                    Expr::col((sequences::Entity, sequences::Column::Value)).add(1),
                )
                .to_owned(),
        )
        .exec_with_returning(conn)
        .await?;

        Ok(counter.value)
    }
}

/// Counter key: one row per company and transaction type.
fn sequence_key(scope: &CompanyScope, transaction_type: TransactionType) -> String {
    format!("{}:{}", scope.company_code(), transaction_type.as_str())
}
