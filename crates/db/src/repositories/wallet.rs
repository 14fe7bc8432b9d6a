//! Wallet repository for database operations.
//!
//! Balance mutation is reserved to the ledger engine; this repository only
//! covers lookup, creation, deactivation, and the conservation audit.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::wallets;

/// Wallet repository.
#[derive(Debug, Clone)]
pub struct WalletRepository {
    db: DatabaseConnection,
}

impl WalletRepository {
    /// Creates a new wallet repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user's wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<wallets::Model>, DbErr> {
        wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Creates a wallet for a user with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including when the user already
    /// has a wallet (unique index on `user_id`).
    pub async fn create(
        &self,
        user_id: Uuid,
        wallet_name: &str,
        currency: &str,
        expires_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<wallets::Model, DbErr> {
        let now = chrono::Utc::now();
        let wallet = wallets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            wallet_name: Set(wallet_name.to_string()),
            currency: Set(currency.to_string()),
            balance: Set(Decimal::ZERO),
            is_active: Set(true),
            expires_at: Set(expires_at.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        wallet.insert(&self.db).await
    }

    /// Deactivates a wallet. Wallets are never deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallet does not exist or the update fails.
    pub async fn deactivate(&self, wallet_id: Uuid) -> Result<wallets::Model, DbErr> {
        let wallet = wallets::Entity::find_by_id(wallet_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("wallet {wallet_id}")))?;

        let mut active: wallets::ActiveModel = wallet.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(&self.db).await
    }

    /// Sums every wallet balance.
    ///
    /// Conservation audit: the total must be invariant across transfers and
    /// distributions, and only grow by external top-ups.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn total_balance(&self) -> Result<Decimal, DbErr> {
        let wallets = wallets::Entity::find().all(&self.db).await?;
        Ok(wallets.iter().map(|w| w.balance).sum())
    }
}
