//! Core business logic for Pesa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and formatting live here.
//!
//! # Modules
//!
//! - `ledger` - wallet-to-wallet value movement: typed requests, receipts,
//!   request validation, and log-entry descriptions

pub mod ledger;
