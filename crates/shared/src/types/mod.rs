//! Common types used across the application.

pub mod scope;

pub use scope::CompanyScope;
