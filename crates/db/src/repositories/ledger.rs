//! The ledger engine: atomic balance mutations and paired log writes.
//!
//! Every public operation runs inside exactly one database transaction.
//! Any early return or error drops the transaction, which rolls it back, so
//! no partial balance change or log entry can survive a failed operation.
//! Concurrent operations on the same wallet serialize on row locks
//! (`SELECT ... FOR UPDATE`); disjoint wallets proceed in parallel.

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::warn;
use uuid::Uuid;

use pesa_core::ledger::{
    describe, validate_distribution, validate_top_up, validate_transfer, Counterparty,
    DistributionCredit, DistributionReceipt, DistributionRequest, HistoryEntry, TopUpReceipt,
    TransferReceipt, TransferRequest, ValidationError,
};
use pesa_shared::types::Currency;

use crate::entities::{ledger_entries, sea_orm_active_enums::EntryDirection, users, wallets};

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Request rejected before any store access.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No wallet exists for the named user.
    #[error("Wallet not found for user {0}")]
    WalletNotFound(Uuid),

    /// The named user's wallet has been deactivated.
    #[error("Wallet for user {0} is inactive")]
    WalletInactive(Uuid),

    /// No user row for the given id.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Sender balance cannot cover the requested amount.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Sender balance at the time of the check.
        available: Decimal,
        /// Amount the operation needed.
        requested: Decimal,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl LedgerError {
    /// True when nothing committed and the whole operation is safe to retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
        )
    }
}

/// Parameters for one log entry write.
struct NewEntry<'a> {
    user_id: Uuid,
    wallet_id: Uuid,
    direction: EntryDirection,
    amount: Decimal,
    description: String,
    counterparty: Option<(Uuid, &'a str)>,
    transfer_id: Uuid,
    external_reference: Option<&'a str>,
}

/// The ledger engine.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves `amount` from the sender's wallet to the recipient's wallet.
    ///
    /// Writes one debit entry for the sender and one credit entry for the
    /// recipient, both carrying the same amount and a shared transfer id.
    /// Either both balances change and both entries exist, or neither.
    ///
    /// A caller-supplied idempotency key makes client retries safe: the key
    /// is stored on the debit entry (namespaced so it can never collide with
    /// a top-up provider reference) under the unique reference index, and a
    /// resubmitted request replays the committed transfer with
    /// `replayed: true` instead of moving funds again.
    ///
    /// # Errors
    ///
    /// Returns `Validation` before any store access, `WalletNotFound` /
    /// `WalletInactive` / `UserNotFound` for missing parties, and
    /// `InsufficientFunds` when the sender cannot cover the amount.
    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt, LedgerError> {
        validate_transfer(&request)?;

        let txn = self.db.begin().await?;

        let stored_key = request.idempotency_key.as_deref().map(transfer_reference);
        if let (Some(key), Some(stored)) = (&request.idempotency_key, &stored_key) {
            let already_applied = ledger_entries::Entity::find()
                .filter(ledger_entries::Column::ExternalReference.eq(stored.as_str()))
                .one(&txn)
                .await?;
            if already_applied.is_some() {
                drop(txn);
                return self.transfer_replay_receipt(key).await;
            }
        }

        // Lock in ascending user-id order so two concurrent transfers over
        // the same pair of wallets cannot deadlock.
        let (first, second) = if request.sender_id <= request.recipient_id {
            (request.sender_id, request.recipient_id)
        } else {
            (request.recipient_id, request.sender_id)
        };
        let first_wallet = lock_wallet(&txn, first).await?;
        let second_wallet = lock_wallet(&txn, second).await?;
        let (sender_wallet, recipient_wallet) = if first == request.sender_id {
            (first_wallet, second_wallet)
        } else {
            (second_wallet, first_wallet)
        };

        ensure_active(&sender_wallet)?;
        ensure_active(&recipient_wallet)?;

        if sender_wallet.balance < request.amount {
            return Err(LedgerError::InsufficientFunds {
                available: sender_wallet.balance,
                requested: request.amount,
            });
        }

        let sender = find_user(&txn, request.sender_id).await?;
        let recipient = find_user(&txn, request.recipient_id).await?;
        let currency = wallet_currency(&sender_wallet);

        let transfer_id = Uuid::new_v4();
        let sender_balance = sender_wallet.balance - request.amount;
        let recipient_balance = recipient_wallet.balance + request.amount;
        let sender_wallet_id = sender_wallet.id;
        let recipient_wallet_id = recipient_wallet.id;

        apply_balance(&txn, sender_wallet, sender_balance).await?;
        apply_balance(&txn, recipient_wallet, recipient_balance).await?;

        let debit_entry = insert_entry(
            &txn,
            NewEntry {
                user_id: sender.id,
                wallet_id: sender_wallet_id,
                direction: EntryDirection::Debit,
                amount: request.amount,
                description: describe::transfer_debit(
                    &recipient.full_name,
                    recipient.id,
                    request.amount,
                    currency,
                ),
                counterparty: Some((recipient.id, &recipient.full_name)),
                transfer_id,
                external_reference: stored_key.as_deref(),
            },
        )
        .await;

        if let Err(e) = debit_entry {
            if let (Some(key), true) = (&request.idempotency_key, is_unique_violation(&e)) {
                drop(txn);
                return self.transfer_replay_receipt(key).await;
            }
            return Err(e.into());
        }

        insert_entry(
            &txn,
            NewEntry {
                user_id: recipient.id,
                wallet_id: recipient_wallet_id,
                direction: EntryDirection::Credit,
                amount: request.amount,
                description: describe::transfer_credit(
                    &sender.full_name,
                    sender.id,
                    request.amount,
                    currency,
                ),
                counterparty: Some((sender.id, &sender.full_name)),
                transfer_id,
                external_reference: None,
            },
        )
        .await?;

        match txn.commit().await {
            Ok(()) => Ok(TransferReceipt {
                transfer_id,
                sender_balance,
                recipient_balance,
                replayed: false,
            }),
            Err(e) => match &request.idempotency_key {
                Some(key) if is_unique_violation(&e) => self.transfer_replay_receipt(key).await,
                _ => Err(e.into()),
            },
        }
    }

    /// Debits the sender once by the aggregate amount and credits every
    /// recipient its share, in input order.
    ///
    /// Writes one credit entry per recipient plus a single debit entry for
    /// the sender that lists every recipient and share. A failure on any
    /// recipient aborts the whole distribution.
    ///
    /// # Errors
    ///
    /// `WalletNotFound` names the specific missing party; `InsufficientFunds`
    /// is checked against the aggregate before any credit happens.
    pub async fn distribute(
        &self,
        request: DistributionRequest,
    ) -> Result<DistributionReceipt, LedgerError> {
        let total = validate_distribution(&request)?;

        let txn = self.db.begin().await?;

        let sender_wallet = lock_wallet(&txn, request.sender_id).await?;
        ensure_active(&sender_wallet)?;

        if sender_wallet.balance < total {
            return Err(LedgerError::InsufficientFunds {
                available: sender_wallet.balance,
                requested: total,
            });
        }

        let sender = find_user(&txn, request.sender_id).await?;
        let currency = wallet_currency(&sender_wallet);

        let transfer_id = Uuid::new_v4();
        let sender_balance = sender_wallet.balance - total;
        let sender_wallet_id = sender_wallet.id;
        apply_balance(&txn, sender_wallet, sender_balance).await?;

        let mut shares = Vec::with_capacity(request.distributions.len());
        let mut credited = Vec::with_capacity(request.distributions.len());

        for share in &request.distributions {
            let wallet = lock_wallet(&txn, share.recipient_id).await?;
            ensure_active(&wallet)?;
            let recipient = find_user(&txn, share.recipient_id).await?;

            let new_balance = wallet.balance + share.amount;
            let wallet_id = wallet.id;
            apply_balance(&txn, wallet, new_balance).await?;

            insert_entry(
                &txn,
                NewEntry {
                    user_id: recipient.id,
                    wallet_id,
                    direction: EntryDirection::Credit,
                    amount: share.amount,
                    description: describe::transfer_credit(
                        &sender.full_name,
                        sender.id,
                        share.amount,
                        currency,
                    ),
                    counterparty: Some((sender.id, &sender.full_name)),
                    transfer_id,
                    external_reference: None,
                },
            )
            .await?;

            shares.push((recipient.full_name.clone(), recipient.id, share.amount));
            credited.push(DistributionCredit {
                recipient_id: recipient.id,
                amount: share.amount,
            });
        }

        // The aggregate debit entry lists every recipient, so it is written
        // after the shares have been resolved.
        insert_entry(
            &txn,
            NewEntry {
                user_id: sender.id,
                wallet_id: sender_wallet_id,
                direction: EntryDirection::Debit,
                amount: total,
                description: describe::distribution_debit(&shares, currency),
                counterparty: None,
                transfer_id,
                external_reference: None,
            },
        )
        .await?;

        txn.commit().await?;

        Ok(DistributionReceipt {
            transfer_id,
            total,
            sender_balance,
            credited,
        })
    }

    /// Credits a wallet for a completed external payment, exactly once per
    /// `reference`.
    ///
    /// Creates the wallet (default currency, zero balance, one-year expiry)
    /// if the user has none yet. A replayed reference is a no-op that
    /// returns the current state with `replayed: true`; the unique index on
    /// the reference closes the race between concurrent replays.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist; validation and
    /// database errors as usual.
    pub async fn credit_from_external_payment(
        &self,
        user_id: Uuid,
        amount: Decimal,
        reference: &str,
    ) -> Result<TopUpReceipt, LedgerError> {
        validate_top_up(amount, reference)?;

        let txn = self.db.begin().await?;

        let stored = topup_reference(reference);
        let already_applied = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ExternalReference.eq(stored.as_str()))
            .one(&txn)
            .await?;
        if already_applied.is_some() {
            drop(txn);
            return self.replay_receipt(reference).await;
        }

        let user = find_user(&txn, user_id).await?;

        let wallet = match lock_wallet(&txn, user_id).await {
            Ok(wallet) => wallet,
            Err(LedgerError::WalletNotFound(_)) => {
                create_wallet(&txn, &user).await?
            }
            Err(e) => return Err(e),
        };

        let new_balance = wallet.balance + amount;
        let wallet_id = wallet.id;
        apply_balance(&txn, wallet, new_balance).await?;

        let entry = insert_entry(
            &txn,
            NewEntry {
                user_id,
                wallet_id,
                direction: EntryDirection::Credit,
                amount,
                description: describe::top_up().to_string(),
                counterparty: None,
                transfer_id: Uuid::new_v4(),
                external_reference: Some(&stored),
            },
        )
        .await;

        if let Err(e) = entry {
            if is_unique_violation(&e) {
                drop(txn);
                return self.replay_receipt(reference).await;
            }
            return Err(e.into());
        }

        match txn.commit().await {
            Ok(()) => Ok(TopUpReceipt {
                wallet_id,
                balance: new_balance,
                replayed: false,
            }),
            Err(e) if is_unique_violation(&e) => self.replay_receipt(reference).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Reads a user's transaction history for one direction, oldest first
    /// (insertion order).
    ///
    /// Entries whose stored counterparty id no longer resolves to a user are
    /// skipped with a warning rather than failing the whole read. Entries
    /// that never had a counterparty (top-ups, aggregate distribution
    /// debits) are returned with `other_user: None`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the database query itself fails.
    pub async fn history(
        &self,
        user_id: Uuid,
        direction: pesa_core::ledger::EntryDirection,
    ) -> Result<Vec<HistoryEntry>, LedgerError> {
        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::UserId.eq(user_id))
            .filter(ledger_entries::Column::Direction.eq(EntryDirection::from(direction)))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut history = Vec::with_capacity(entries.len());
        for entry in entries {
            let other_user = match entry.counterparty_user_id {
                None => None,
                Some(counterparty_id) => {
                    match users::Entity::find_by_id(counterparty_id).one(&self.db).await? {
                        Some(user) => Some(Counterparty {
                            user_id: user.id,
                            name: user.full_name,
                            email: user.email,
                        }),
                        None => {
                            warn!(
                                entry_id = %entry.id,
                                counterparty_id = %counterparty_id,
                                "Skipping history entry: counterparty cannot be resolved"
                            );
                            continue;
                        }
                    }
                }
            };

            history.push(HistoryEntry {
                transaction_id: entry.id,
                direction: entry.direction.into(),
                amount: entry.amount,
                description: entry.description,
                timestamp: entry.created_at.with_timezone(&chrono::Utc),
                other_user,
            });
        }

        Ok(history)
    }

    /// Rebuilds the receipt for a transfer whose idempotency key was already
    /// applied. Balances are read at replay time.
    async fn transfer_replay_receipt(&self, key: &str) -> Result<TransferReceipt, LedgerError> {
        let entry = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ExternalReference.eq(transfer_reference(key)))
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("ledger entry for key {key}")))?;

        let recipient_id = entry
            .counterparty_user_id
            .ok_or_else(|| DbErr::RecordNotFound(format!("counterparty for key {key}")))?;

        let sender_balance = wallet_balance(&self.db, entry.user_id).await?;
        let recipient_balance = wallet_balance(&self.db, recipient_id).await?;

        Ok(TransferReceipt {
            transfer_id: entry.transfer_id,
            sender_balance,
            recipient_balance,
            replayed: true,
        })
    }

    /// Rebuilds the top-up receipt for a reference that was already applied.
    async fn replay_receipt(&self, reference: &str) -> Result<TopUpReceipt, LedgerError> {
        let entry = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::ExternalReference.eq(topup_reference(reference)))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                DbErr::RecordNotFound(format!("ledger entry for reference {reference}"))
            })?;

        let wallet = wallets::Entity::find_by_id(entry.wallet_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("wallet {}", entry.wallet_id)))?;

        Ok(TopUpReceipt {
            wallet_id: wallet.id,
            balance: wallet.balance,
            replayed: true,
        })
    }
}

/// Loads and row-locks a user's wallet within the transaction.
async fn lock_wallet(
    txn: &DatabaseTransaction,
    user_id: Uuid,
) -> Result<wallets::Model, LedgerError> {
    wallets::Entity::find()
        .filter(wallets::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(LedgerError::WalletNotFound(user_id))
}

async fn wallet_balance(db: &DatabaseConnection, user_id: Uuid) -> Result<Decimal, LedgerError> {
    wallets::Entity::find()
        .filter(wallets::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .map(|w| w.balance)
        .ok_or(LedgerError::WalletNotFound(user_id))
}

async fn find_user(txn: &DatabaseTransaction, user_id: Uuid) -> Result<users::Model, LedgerError> {
    users::Entity::find_by_id(user_id)
        .one(txn)
        .await?
        .ok_or(LedgerError::UserNotFound(user_id))
}

fn ensure_active(wallet: &wallets::Model) -> Result<(), LedgerError> {
    if wallet.is_active {
        Ok(())
    } else {
        Err(LedgerError::WalletInactive(wallet.user_id))
    }
}

fn wallet_currency(wallet: &wallets::Model) -> Currency {
    Currency::from_str(&wallet.currency).unwrap_or_default()
}

/// Writes the new balance back; the row is already locked by the caller.
async fn apply_balance(
    txn: &DatabaseTransaction,
    wallet: wallets::Model,
    new_balance: Decimal,
) -> Result<(), DbErr> {
    let mut active: wallets::ActiveModel = wallet.into();
    active.balance = Set(new_balance);
    active.updated_at = Set(chrono::Utc::now().into());
    active.update(txn).await?;
    Ok(())
}

/// Creates a fresh wallet for a user on first external top-up.
async fn create_wallet(
    txn: &DatabaseTransaction,
    user: &users::Model,
) -> Result<wallets::Model, DbErr> {
    let now = chrono::Utc::now();
    let wallet = wallets::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        wallet_name: Set(format!("{}'s Wallet", user.full_name)),
        currency: Set(Currency::default().to_string()),
        balance: Set(Decimal::ZERO),
        is_active: Set(true),
        expires_at: Set(Some((now + chrono::Duration::days(365)).into())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    wallet.insert(txn).await
}

/// Appends one immutable log entry.
async fn insert_entry(
    txn: &DatabaseTransaction,
    entry: NewEntry<'_>,
) -> Result<ledger_entries::Model, DbErr> {
    let (counterparty_user_id, counterparty_name) = match entry.counterparty {
        Some((id, name)) => (Some(id), Some(name.to_string())),
        None => (None, None),
    };

    let model = ledger_entries::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(entry.user_id),
        wallet_id: Set(entry.wallet_id),
        direction: Set(entry.direction),
        amount: Set(entry.amount),
        description: Set(entry.description),
        counterparty_user_id: Set(counterparty_user_id),
        counterparty_name: Set(counterparty_name),
        transfer_id: Set(entry.transfer_id),
        external_reference: Set(entry.external_reference.map(ToString::to_string)),
        created_at: Set(chrono::Utc::now().into()),
    };

    model.insert(txn).await
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// Stored idempotency references are namespaced by origin. Transfer keys and
// top-up provider references share the unique index but must never collide:
// a transfer key must not consume a pending provider reference, and a replay
// lookup must only ever find entries of its own kind.
fn transfer_reference(key: &str) -> String {
    format!("transfer:{key}")
}

fn topup_reference(reference: &str) -> String {
    format!("topup:{reference}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_message_names_both_amounts() {
        let err = LedgerError::InsufficientFunds {
            available: dec!(10),
            requested: dec!(25),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: available 10, requested 25"
        );
    }

    #[test]
    fn test_transient_classification() {
        let not_found = LedgerError::WalletNotFound(Uuid::nil());
        assert!(!not_found.is_transient());

        let validation: LedgerError = ValidationError::EmptyDistribution.into();
        assert!(!validation.is_transient());

        let conn = LedgerError::Database(DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "connection refused".to_string(),
        )));
        assert!(conn.is_transient());
    }

    #[test]
    fn test_reference_namespaces_are_disjoint() {
        assert_eq!(transfer_reference("abc"), "transfer:abc");
        assert_eq!(topup_reference("abc"), "topup:abc");
        assert_ne!(transfer_reference("abc"), topup_reference("abc"));
        // A crafted raw value cannot jump namespaces either.
        assert_ne!(transfer_reference("topup:abc"), topup_reference("abc"));
    }

    #[test]
    fn test_direction_mapping_round_trips() {
        let credit: pesa_core::ledger::EntryDirection = EntryDirection::Credit.into();
        assert_eq!(EntryDirection::from(credit), EntryDirection::Credit);

        let debit: pesa_core::ledger::EntryDirection = EntryDirection::Debit.into();
        assert_eq!(EntryDirection::from(debit), EntryDirection::Debit);
    }
}
