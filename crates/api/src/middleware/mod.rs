//! Request middleware.

pub mod auth;

pub use auth::{AuthCompany, auth_middleware};
