use tracing::{debug, info, warn};

use crate::domain::{Account, AccountStatus, AccountView, Cents, CurrencyCode, OperationRequest};
use crate::storage::{AccountStore, SqliteAccountStore};

use super::{AppError, rules};

/// Application service for account inquiries and balance operations.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct AccountService<S = SqliteAccountStore> {
    store: S,
}

impl AccountService<SqliteAccountStore> {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let store = SqliteAccountStore::init(&db_url).await?;
        Ok(Self::new(store))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let store = SqliteAccountStore::connect(&db_url).await?;
        Ok(Self::new(store))
    }
}

impl<S: AccountStore> AccountService<S> {
    /// Create a new account service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================
    // Queries
    // ========================

    async fn find_account(&self, account_number: &str) -> Result<Account, AppError> {
        self.store
            .find(account_number)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(account_number.to_string()))
    }

    /// Current status of an account.
    pub async fn get_status(&self, account_number: &str) -> Result<AccountStatus, AppError> {
        debug!(account_number, "Getting account status");
        let account = self.find_account(account_number).await?;
        Ok(account.status)
    }

    /// Balance inquiry: the full account view.
    pub async fn get_balance(&self, account_number: &str) -> Result<AccountView, AppError> {
        debug!(account_number, "Getting account balance inquiry");
        let account = self.find_account(account_number).await?;
        Ok(account.view())
    }

    /// All accounts, ordered by account number.
    pub async fn list_accounts(&self) -> Result<Vec<AccountView>, AppError> {
        let accounts = self.store.list().await?;
        Ok(accounts.iter().map(AccountView::from).collect())
    }

    // ========================
    // Operations
    // ========================

    /// Apply a signed operation to an account as one unit of work:
    /// load, validate, compute the new balance, persist.
    ///
    /// Nothing is written unless every step succeeds.
    pub async fn apply_operation(
        &self,
        operation: &OperationRequest,
    ) -> Result<AccountView, AppError> {
        operation.validate()?;

        info!(
            account_number = %operation.account_number,
            sign = %operation.sign,
            amount = operation.amount,
            currency = operation.currency,
            "Operation started"
        );

        match self.run_operation(operation).await {
            Ok(view) => {
                info!(
                    account_number = %view.account_number,
                    balance = view.balance,
                    "Operation finished"
                );
                Ok(view)
            }
            Err(err) => {
                warn!(
                    account_number = %operation.account_number,
                    sign = %operation.sign,
                    error = %err,
                    "Operation aborted"
                );
                Err(err)
            }
        }
    }

    async fn run_operation(&self, operation: &OperationRequest) -> Result<AccountView, AppError> {
        let mut uow = self.store.begin().await?;

        let mut account = uow
            .load(&operation.account_number)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(operation.account_number.clone()))?;

        rules::validate(&account, operation)?;

        account.balance = rules::transition(
            &account.account_number,
            account.balance,
            operation.sign,
            operation.amount,
        )?;

        let updated = uow.replace(&account).await?;
        uow.commit().await?;

        Ok(updated.view())
    }

    // ========================
    // Provisioning
    // ========================

    /// Provision a new account. This sits outside the operation engine and
    /// is how accounts come to exist at all.
    pub async fn open_account(
        &self,
        account_number: &str,
        currency: CurrencyCode,
        opening_balance: Cents,
        status: AccountStatus,
    ) -> Result<AccountView, AppError> {
        let account_number = check_new_account(account_number, opening_balance)?;

        // Check if account already exists
        if self.store.find(account_number).await?.is_some() {
            return Err(AppError::AccountAlreadyExists(account_number.to_string()));
        }

        let account = Account::new(account_number, currency)
            .with_balance(opening_balance)
            .with_status(status);
        self.store.insert(&account).await?;

        info!(account_number, currency, status = %status, "Account provisioned");
        Ok(account.view())
    }
}

/// Field checks for a new account. Returns the trimmed account number the
/// account is stored under.
pub fn check_new_account(account_number: &str, opening_balance: Cents) -> Result<&str, AppError> {
    let account_number = account_number.trim();
    if account_number.is_empty() {
        return Err(AppError::InvalidRequest(
            "accountNumber must be not empty".to_string(),
        ));
    }
    if opening_balance < 0 {
        return Err(AppError::InvalidAmount(
            "opening balance must not be negative".to_string(),
        ));
    }
    Ok(account_number)
}
