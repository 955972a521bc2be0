use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::Account;

use super::{AccountStore, UnitOfWork};

type Accounts = BTreeMap<String, Account>;

/// In-process [`AccountStore`]. A unit of work holds the map lock from its
/// first `load` until it is committed or dropped.
#[derive(Clone, Default)]
pub struct MemoryAccountStore {
    accounts: Arc<Mutex<Accounts>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|a| (a.account_number.clone(), a))
            .collect();
        Self {
            accounts: Arc::new(Mutex::new(accounts)),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find(&self, account_number: &str) -> Result<Option<Account>> {
        Ok(self.accounts.lock().await.get(account_number).cloned())
    }

    async fn insert(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&account.account_number) {
            bail!("Account {} already stored", account.account_number);
        }
        accounts.insert(account.account_number.clone(), account.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.lock().await.values().cloned().collect())
    }

    async fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>> {
        Ok(Box::new(MemoryUnitOfWork {
            accounts: Arc::clone(&self.accounts),
            guard: None,
            staged: Vec::new(),
        }))
    }
}

pub struct MemoryUnitOfWork {
    accounts: Arc<Mutex<Accounts>>,
    guard: Option<OwnedMutexGuard<Accounts>>,
    staged: Vec<Account>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn load(&mut self, account_number: &str) -> Result<Option<Account>> {
        if self.guard.is_none() {
            self.guard = Some(Arc::clone(&self.accounts).lock_owned().await);
        }
        if let Some(staged) = self.staged.iter().find(|a| a.account_number == account_number) {
            return Ok(Some(staged.clone()));
        }
        Ok(self
            .guard
            .as_ref()
            .and_then(|accounts| accounts.get(account_number).cloned()))
    }

    async fn replace(&mut self, account: &Account) -> Result<Account> {
        let Some(accounts) = self.guard.as_ref() else {
            bail!("replace called before load");
        };
        if !accounts.contains_key(&account.account_number) {
            bail!(
                "Account {} is not stored; nothing to replace",
                account.account_number
            );
        }
        self.staged.retain(|a| a.account_number != account.account_number);
        self.staged.push(account.clone());
        Ok(account.clone())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryUnitOfWork { guard, staged, .. } = *self;
        if let Some(mut accounts) = guard {
            for account in staged {
                accounts.insert(account.account_number.clone(), account);
            }
        }
        Ok(())
    }
}
