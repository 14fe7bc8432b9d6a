//! Wallet ledger domain logic.
//!
//! This module holds everything that can be decided without touching the
//! store: typed transfer/distribution/top-up requests, the validation rules
//! that reject them before any transaction is opened, the receipts the
//! engine hands back, and the human-readable descriptions written into the
//! transaction log.

pub mod describe;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::ValidationError;
pub use types::{
    Counterparty, Distribution, DistributionCredit, DistributionReceipt, DistributionRequest,
    EntryDirection, HistoryEntry, TopUpReceipt, TransferReceipt, TransferRequest,
};
pub use validation::{validate_distribution, validate_top_up, validate_transfer};
