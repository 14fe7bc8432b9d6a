//! Shared types, errors, and configuration for Pesa.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Application-wide error types
//! - Configuration management
//! - The checkout-provider client for wallet top-ups

pub mod checkout;
pub mod config;
pub mod error;
pub mod types;

pub use checkout::{CheckoutService, CheckoutSession};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
