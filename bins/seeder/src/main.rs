//! Database seeder for Pesa development and testing.
//!
//! Seeds demo users and funds their wallets through seeded top-up credits,
//! then prints the conservation total. Re-running the seeder is safe: users
//! are skipped when present and top-up references replay idempotently.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use pesa_db::entities::users;
use pesa_db::{LedgerRepository, WalletRepository};
use pesa_shared::config::DatabaseConfig;

/// Demo users with fixed IDs so re-runs and local tooling stay stable.
const DEMO_USERS: [(&str, &str, &str, Decimal); 3] = [
    (
        "00000000-0000-0000-0000-0000000000a1",
        "Amara Sesay",
        "amara@pesa.dev",
        dec!(500.00),
    ),
    (
        "00000000-0000-0000-0000-0000000000a2",
        "Ibrahim Kamara",
        "ibrahim@pesa.dev",
        dec!(250.00),
    ),
    (
        "00000000-0000-0000-0000-0000000000a3",
        "Fatmata Conteh",
        "fatmata@pesa.dev",
        dec!(100.00),
    ),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let config = DatabaseConfig {
        url: database_url,
        max_connections: 5,
        min_connections: 1,
    };

    println!("Connecting to database...");
    let db = pesa_db::connect(&config)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo users...");
    seed_demo_users(&db).await;

    println!("Funding demo wallets...");
    fund_demo_wallets(&db).await;

    let total = WalletRepository::new(db.clone())
        .total_balance()
        .await
        .expect("Failed to read wallet totals");
    println!("Seeding complete! Total wallet balance: {total}");
}

/// Seeds the demo users, skipping any that already exist.
async fn seed_demo_users(db: &DatabaseConnection) {
    for (id, full_name, email, _) in DEMO_USERS {
        let user_id = Uuid::parse_str(id).unwrap();

        if users::Entity::find_by_id(user_id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  User {email} already exists, skipping...");
            continue;
        }

        let user = users::ActiveModel {
            id: Set(user_id),
            full_name: Set(full_name.to_string()),
            email: Set(email.to_string()),
            phone: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {email}: {e}");
        } else {
            println!("  Created user: {email}");
        }
    }
}

/// Funds each demo wallet through a seeded top-up credit.
///
/// The reference is derived from the user id, so a second run replays the
/// same credit instead of doubling the balance.
async fn fund_demo_wallets(db: &DatabaseConnection) {
    let ledger = LedgerRepository::new(db.clone());

    for (id, _, email, amount) in DEMO_USERS {
        let user_id = Uuid::parse_str(id).unwrap();
        let reference = format!("seed-topup-{user_id}");

        match ledger
            .credit_from_external_payment(user_id, amount, &reference)
            .await
        {
            Ok(receipt) if receipt.replayed => {
                println!("  Wallet for {email} already funded, skipping...");
            }
            Ok(receipt) => {
                println!("  Funded wallet for {email}: balance {}", receipt.balance);
            }
            Err(e) => eprintln!("Failed to fund wallet for {email}: {e}"),
        }
    }
}
