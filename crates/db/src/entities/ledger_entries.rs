//! `SeaORM` Entity for the ledger_entries table.
//!
//! Append-only transaction log. No repository exposes an update or delete
//! path for these rows. The counterparty is stored as a structured
//! id + name snapshot, never recovered by parsing the description.
//! `counterparty_user_id` deliberately carries no foreign key so the log
//! stays intact even if user rows are ever purged; resolution at read time
//! is best-effort.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryDirection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_id: Uuid,
    pub direction: EntryDirection,
    pub amount: Decimal,
    pub description: String,
    pub counterparty_user_id: Option<Uuid>,
    pub counterparty_name: Option<String>,
    /// Correlation id shared by all entries of one transfer/distribution.
    pub transfer_id: Uuid,
    /// Idempotency reference, namespaced by origin (`topup:` provider
    /// references, `transfer:` client retry keys); unique where present.
    pub external_reference: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id"
    )]
    Wallets,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
