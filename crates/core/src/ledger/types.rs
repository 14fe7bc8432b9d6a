//! Domain types for ledger operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Semantic direction of a transaction-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    /// Value entered the wallet.
    Credit,
    /// Value left the wallet.
    Debit,
}

impl std::fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credit => write!(f, "credit"),
            Self::Debit => write!(f, "debit"),
        }
    }
}

impl std::str::FromStr for EntryDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("Unknown entry direction: {s}")),
        }
    }
}

/// A one-to-one transfer between two user wallets.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// User sending the funds.
    pub sender_id: Uuid,
    /// User receiving the funds.
    pub recipient_id: Uuid,
    /// Amount to move; must be strictly positive.
    pub amount: Decimal,
    /// Caller-supplied key making client retries safe: a resubmitted request
    /// with the same key replays the committed transfer instead of moving
    /// funds twice. Non-blank when present.
    pub idempotency_key: Option<String>,
}

/// One share of a distribution.
#[derive(Debug, Clone)]
pub struct Distribution {
    /// User receiving this share.
    pub recipient_id: Uuid,
    /// Share amount; must be strictly positive.
    pub amount: Decimal,
}

/// A one-to-many distribution from one sender wallet.
#[derive(Debug, Clone)]
pub struct DistributionRequest {
    /// User funding every share.
    pub sender_id: Uuid,
    /// Shares in the order they will be credited.
    pub distributions: Vec<Distribution>,
}

/// Receipt for a committed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    /// Correlation id shared by the paired debit/credit log entries.
    pub transfer_id: Uuid,
    /// Sender balance after commit (current balance on a replay).
    pub sender_balance: Decimal,
    /// Recipient balance after commit (current balance on a replay).
    pub recipient_balance: Decimal,
    /// True when the idempotency key had been applied before and this call
    /// moved nothing.
    pub replayed: bool,
}

/// One credited share within a committed distribution.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionCredit {
    /// Recipient user id.
    pub recipient_id: Uuid,
    /// Amount credited.
    pub amount: Decimal,
}

/// Receipt for a committed distribution.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReceipt {
    /// Correlation id shared by the debit entry and every credit entry.
    pub transfer_id: Uuid,
    /// Aggregate amount debited from the sender.
    pub total: Decimal,
    /// Sender balance after commit.
    pub sender_balance: Decimal,
    /// Credited shares in input order.
    pub credited: Vec<DistributionCredit>,
}

/// Receipt for an external-payment wallet credit.
#[derive(Debug, Clone, Serialize)]
pub struct TopUpReceipt {
    /// Wallet that was (or had already been) credited.
    pub wallet_id: Uuid,
    /// Wallet balance after the operation.
    pub balance: Decimal,
    /// True when the external reference had been applied before and this
    /// call changed nothing.
    pub replayed: bool,
}

/// The counterparty of a history entry, resolved at read time.
#[derive(Debug, Clone, Serialize)]
pub struct Counterparty {
    /// Counterparty user id.
    pub user_id: Uuid,
    /// Full name at resolution time.
    pub name: String,
    /// Email at resolution time.
    pub email: String,
}

/// One row of a user's transaction history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Log entry id.
    pub transaction_id: Uuid,
    /// Entry direction.
    pub direction: EntryDirection,
    /// Entry amount.
    pub amount: Decimal,
    /// Description as stored in the log.
    pub description: String,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
    /// Resolved counterparty; `None` for entries that never had one
    /// (top-ups, aggregate distribution debits).
    pub other_user: Option<Counterparty>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(
            EntryDirection::from_str("credit").unwrap(),
            EntryDirection::Credit
        );
        assert_eq!(
            EntryDirection::from_str("DEBIT").unwrap(),
            EntryDirection::Debit
        );
        assert_eq!(EntryDirection::Credit.to_string(), "credit");
        assert_eq!(EntryDirection::Debit.to_string(), "debit");
        assert!(EntryDirection::from_str("withdrawal").is_err());
    }
}
