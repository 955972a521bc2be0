// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use tempfile::TempDir;
use teller::application::AccountService;
use teller::domain::{AccountStatus, AccountView, Cents, CurrencyCode};

pub const EUR: CurrencyCode = 978;
pub const USD: CurrencyCode = 840;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(AccountService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = AccountService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Test fixture: the accounts used throughout the suites
pub struct StandardAccounts;

impl StandardAccounts {
    /// A1: EUR 20.00 open, A2: USD 1002.00 open, A3: EUR 20.00 closed
    pub async fn create(service: &AccountService) -> Result<()> {
        open(service, "A1", EUR, 2000).await?;
        open(service, "A2", USD, 100200).await?;
        service
            .open_account("A3", EUR, 2000, AccountStatus::Closed)
            .await?;
        Ok(())
    }
}

pub async fn open(
    service: &AccountService,
    number: &str,
    currency: CurrencyCode,
    balance: Cents,
) -> Result<AccountView> {
    Ok(service
        .open_account(number, currency, balance, AccountStatus::Open)
        .await?)
}

pub async fn balance_of(service: &AccountService, number: &str) -> Result<Cents> {
    Ok(service.get_balance(number).await?.balance)
}
