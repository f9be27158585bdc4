//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod item;
pub mod party;
pub mod sequence;
pub mod transaction;

pub use item::{CreateItemInput, ItemError, ItemRepository};
pub use party::{CreatePartyInput, PartyError, PartyRepository};
pub use sequence::SequenceRepository;
pub use transaction::{
    CreateTransactionInput, LineView, TransactionError, TransactionFilter, TransactionRepository,
    TransactionView, UpdateTransactionInput,
};
