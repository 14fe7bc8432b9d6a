//! Repository abstractions for data access.

pub mod ledger;
pub mod user;
pub mod wallet;

pub use ledger::{LedgerError, LedgerRepository};
pub use user::UserRepository;
pub use wallet::WalletRepository;
