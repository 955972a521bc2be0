use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::money::{Cents, CurrencyCode, decimal_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Open,
    /// Closed accounts reject every operation.
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Open => "OPEN",
            AccountStatus::Closed => "CLOSED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPEN" => Some(AccountStatus::Open),
            "CLOSED" => Some(AccountStatus::Closed),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The persisted account record.
///
/// Two accounts are equal when their account numbers are equal, whatever
/// their balance or status: the number is the record's identity and never
/// changes once the account is provisioned.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_number: String,
    pub currency: CurrencyCode,
    pub balance: Cents,
    pub status: AccountStatus,
}

impl Account {
    pub fn new(account_number: impl Into<String>, currency: CurrencyCode) -> Self {
        Self {
            account_number: account_number.into(),
            currency,
            balance: 0,
            status: AccountStatus::Open,
        }
    }

    pub fn with_balance(mut self, balance: Cents) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == AccountStatus::Open
    }

    pub fn view(&self) -> AccountView {
        AccountView::from(self)
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.account_number == other.account_number
    }
}

impl Eq for Account {}

impl Hash for Account {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.account_number.hash(state);
    }
}

/// Read projection of an [`Account`] handed back to callers.
///
/// Unlike the entity, a view is a plain value and compares field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub account_number: String,
    pub currency: CurrencyCode,
    #[serde(with = "decimal_string")]
    pub balance: Cents,
    pub status: AccountStatus,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            account_number: account.account_number.clone(),
            currency: account.currency,
            balance: account.balance,
            status: account.status,
        }
    }
}

impl From<AccountView> for Account {
    fn from(view: AccountView) -> Self {
        Self {
            account_number: view.account_number,
            currency: view.currency,
            balance: view.balance,
            status: view.status,
        }
    }
}
