//! `SeaORM` entity definitions.

pub mod items;
pub mod parties;
pub mod sea_orm_active_enums;
pub mod sequences;
pub mod transaction_lines;
pub mod transactions;
