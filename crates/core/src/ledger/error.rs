//! Error types for ledger request validation.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// A request was rejected before any store transaction was opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Amounts must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// A wallet cannot transfer to itself.
    #[error("Sender and recipient are the same user: {0}")]
    SelfTransfer(Uuid),

    /// A distribution must have at least one share.
    #[error("Distribution list is empty")]
    EmptyDistribution,

    /// An external payment reference must be non-empty.
    #[error("External payment reference is empty")]
    EmptyReference,
}
