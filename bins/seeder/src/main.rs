//! Database seeder for development and testing.
//!
//! Seeds a demo user, the "General" fund and a donation bank account.
//! Running it twice leaves the data unchanged.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;
use sea_orm_migration::MigratorTrait;
use tsnt_core::finance::{
    BankAccountService, CreateBankAccountInput, CreateFundInput, FundService, UserSummary,
};
use tsnt_db::{PgFinanceStore, UserRepository, migration::Migrator};
use tsnt_shared::types::UserId;
use uuid::Uuid;

/// Demo user ID (consistent for all seeds)
const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0002);

const GENERAL_FUND: &str = "General";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = tsnt_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;
    Migrator::up(&db, None).await.context("failed to run migrations")?;

    println!("Seeding demo user...");
    seed_demo_user(&UserRepository::new(db.clone())).await?;

    let store = Arc::new(PgFinanceStore::new(db));

    println!("Seeding funds...");
    seed_general_fund(&FundService::new(Arc::clone(&store))).await?;

    println!("Seeding bank accounts...");
    seed_bank_account(&BankAccountService::new(store)).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_demo_user(users: &UserRepository) -> anyhow::Result<()> {
    let user = users
        .upsert(&UserSummary {
            id: UserId::from_uuid(DEMO_USER_ID),
            username: "demo".to_string(),
            email: Some("demo@thapsangniemtin.vn".to_string()),
            full_name: Some("Demo User".to_string()),
            avatar: None,
        })
        .await?;
    println!("  User {} ({})", user.username, user.id);
    Ok(())
}

async fn seed_general_fund(funds: &FundService<PgFinanceStore>) -> anyhow::Result<()> {
    if funds.list().await?.iter().any(|f| f.name == GENERAL_FUND) {
        println!("  General fund already exists, skipping...");
        return Ok(());
    }

    let fund = funds
        .create(CreateFundInput {
            name: GENERAL_FUND.to_string(),
            initial_balance: Decimal::ZERO,
            currency: None,
            account_num: None,
        })
        .await?;
    println!("  Created fund {} ({})", fund.name, fund.id);
    Ok(())
}

async fn seed_bank_account(accounts: &BankAccountService<PgFinanceStore>) -> anyhow::Result<()> {
    if !accounts.list(false).await?.is_empty() {
        println!("  Bank accounts already exist, skipping...");
        return Ok(());
    }

    let account = accounts
        .create(CreateBankAccountInput {
            bank_name: "Vietcombank".to_string(),
            account_number: "0071000123456".to_string(),
            account_holder: "QUY THAP SANG NIEM TIN".to_string(),
            note: Some("Ghi noi dung: UNG HO <ho ten>".to_string()),
            ..Default::default()
        })
        .await?;
    println!("  Created bank account {} ({})", account.bank_name, account.id);
    Ok(())
}
