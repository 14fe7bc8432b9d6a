//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry, backed by the `entry_direction` pg enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_direction")]
pub enum EntryDirection {
    /// Value entered the wallet.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Value left the wallet.
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl From<pesa_core::ledger::EntryDirection> for EntryDirection {
    fn from(direction: pesa_core::ledger::EntryDirection) -> Self {
        match direction {
            pesa_core::ledger::EntryDirection::Credit => Self::Credit,
            pesa_core::ledger::EntryDirection::Debit => Self::Debit,
        }
    }
}

impl From<EntryDirection> for pesa_core::ledger::EntryDirection {
    fn from(direction: EntryDirection) -> Self {
        match direction {
            EntryDirection::Credit => Self::Credit,
            EntryDirection::Debit => Self::Debit,
        }
    }
}
