//! Initial database migration.
//!
//! Creates the users, wallets, and ledger_entries tables together with the
//! constraints the ledger engine relies on: one wallet per user, non-negative
//! balances, positive entry amounts, and a unique external payment reference.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(WALLETS_SQL).await?;
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Semantic direction of a ledger entry
CREATE TYPE entry_direction AS ENUM ('credit', 'debit');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    full_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const WALLETS_SQL: &str = r"
CREATE TABLE wallets (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    wallet_name TEXT NOT NULL,
    currency TEXT NOT NULL DEFAULT 'SLE',
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    expires_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Exactly one wallet per user
CREATE UNIQUE INDEX idx_wallets_user ON wallets(user_id);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    wallet_id UUID NOT NULL REFERENCES wallets(id),
    direction entry_direction NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    description TEXT NOT NULL,
    -- Structured counterparty snapshot; no FK so the log survives user purges
    counterparty_user_id UUID,
    counterparty_name TEXT,
    transfer_id UUID NOT NULL,
    external_reference TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_ledger_entries_user_direction
    ON ledger_entries(user_id, direction, created_at);
CREATE INDEX idx_ledger_entries_transfer ON ledger_entries(transfer_id);

-- Idempotence key, namespaced by origin ('topup:' provider references,
-- 'transfer:' client retry keys): each applies at most once
CREATE UNIQUE INDEX idx_ledger_entries_external_reference
    ON ledger_entries(external_reference)
    WHERE external_reference IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS wallets;
DROP TABLE IF EXISTS users;
DROP TYPE IF EXISTS entry_direction;
";
