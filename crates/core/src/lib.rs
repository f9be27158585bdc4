//! Core business logic for Vypar.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `posting` - Transaction posting: GST tax splits, stock deltas, line
//!   enrichment, and status-transition guards

pub mod posting;
