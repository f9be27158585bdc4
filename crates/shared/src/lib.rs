//! Shared types, errors, and configuration for Vypar.
//!
//! This crate provides common types used across all other crates:
//! - Configuration management
//! - JWT token handling for company-scoped authentication
//! - The `CompanyScope` tenant context passed into every core operation

pub mod config;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use types::CompanyScope;
