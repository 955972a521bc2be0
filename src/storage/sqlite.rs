use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::domain::{Account, AccountStatus};

use super::{AccountStore, MIGRATION_001_ACCOUNTS, UnitOfWork};

/// How long a unit of work waits for another one holding the write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// [`AccountStore`] backed by a SQLite database.
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    /// Create a new store with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL such as `sqlite:teller.db`.
    /// Append `?mode=rwc` to create the file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_ACCOUNTS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let store = Self::connect(database_url).await?;
        store.migrate().await?;
        Ok(store)
    }

    fn row_to_account(row: &SqliteRow) -> Result<Account> {
        let status_str: String = row.get("status");

        Ok(Account {
            account_number: row.get("account_number"),
            currency: row.get("currency"),
            balance: row.get("balance"),
            status: AccountStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid account status: {}", status_str))?,
        })
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn find(&self, account_number: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT account_number, currency, balance, status
            FROM accounts
            WHERE account_number = ?
            "#,
        )
        .bind(account_number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn insert(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (account_number, currency, balance, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&account.account_number)
        .bind(account.currency)
        .bind(account.balance)
        .bind(account.status.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            "SELECT account_number, currency, balance, status FROM accounts ORDER BY account_number",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        rows.iter().map(Self::row_to_account).collect()
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(Box::new(SqliteUnitOfWork { tx }))
    }
}

/// A deferred SQLite transaction. Dropping it without commit rolls back.
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl UnitOfWork for SqliteUnitOfWork {
    async fn load(&mut self, account_number: &str) -> Result<Option<Account>> {
        // Writing first takes the database write lock before the balance is
        // read; a concurrent unit of work waits here until this one ends.
        sqlx::query("UPDATE accounts SET balance = balance WHERE account_number = ?")
            .bind(account_number)
            .execute(&mut *self.tx)
            .await
            .context("Failed to lock account")?;

        let row = sqlx::query(
            r#"
            SELECT account_number, currency, balance, status
            FROM accounts
            WHERE account_number = ?
            "#,
        )
        .bind(account_number)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to load account")?;

        row.as_ref().map(SqliteAccountStore::row_to_account).transpose()
    }

    async fn replace(&mut self, account: &Account) -> Result<Account> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET currency = ?, balance = ?, status = ?
            WHERE account_number = ?
            "#,
        )
        .bind(account.currency)
        .bind(account.balance)
        .bind(account.status.as_str())
        .bind(&account.account_number)
        .execute(&mut *self.tx)
        .await
        .context("Failed to update account")?;

        if result.rows_affected() != 1 {
            bail!(
                "Account {} is not stored; nothing to replace",
                account.account_number
            );
        }
        Ok(account.clone())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }
}
