use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Account;

/// Keyed account record store.
///
/// The store enforces no business rules. Reads outside a [`UnitOfWork`] are
/// plain point lookups; anything that changes a balance goes through
/// [`AccountStore::begin`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by number.
    async fn find(&self, account_number: &str) -> Result<Option<Account>>;

    /// Provision a new account. Fails if the number is already taken.
    async fn insert(&self, account: &Account) -> Result<()>;

    /// All accounts, ordered by account number.
    async fn list(&self) -> Result<Vec<Account>>;

    /// Open a unit of work.
    ///
    /// Units of work on the same store are serialised from their first
    /// `load` until they are committed or dropped, so a load..replace pair
    /// behaves as one atomic read-modify-write.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork + '_>>;
}

/// A scoped read-modify-write transaction against an [`AccountStore`].
///
/// Writes become visible only on [`UnitOfWork::commit`]; dropping the unit
/// of work rolls back.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn load(&mut self, account_number: &str) -> Result<Option<Account>>;

    /// Overwrite the stored record for `account.account_number`.
    /// The record must have been loaded in this unit of work.
    async fn replace(&mut self, account: &Account) -> Result<Account>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
