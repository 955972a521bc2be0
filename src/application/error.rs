use thiserror::Error;

use crate::domain::{AccountStatus, Cents, CurrencyCode, OperationSign, format_cents};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account does not exist: {0}")]
    AccountNotFound(String),

    #[error("Account {account_number} is not OPEN (status: {status})")]
    AccountNotOpen {
        account_number: String,
        status: AccountStatus,
    },

    #[error(
        "Account and operation currencies are different: account {account_number} uses {account_currency}, operation uses {operation_currency}"
    )]
    CurrencyMismatch {
        account_number: String,
        account_currency: CurrencyCode,
        operation_currency: CurrencyCode,
    },

    #[error(
        "Insufficient funds in account {account_number}: balance {}, required {}",
        money(.balance),
        money(.required)
    )]
    InsufficientFunds {
        account_number: String,
        balance: Cents,
        required: Cents,
    },

    #[error(
        "{sign} of {} would overflow the balance of account {account_number}",
        money(.amount)
    )]
    BalanceOverflow {
        account_number: String,
        sign: OperationSign,
        amount: Cents,
    },

    #[error("Account already exists: {0}")]
    AccountAlreadyExists(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Database error: {0:#}")]
    Database(#[from] anyhow::Error),
}

fn money(cents: &Cents) -> String {
    format_cents(*cents)
}

impl AppError {
    /// Caller-caused failures. Everything else is a collaborator failure
    /// passed through unchanged.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_identifiers() {
        let err = AppError::InsufficientFunds {
            account_number: "A1".into(),
            balance: 2000,
            required: 2500,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds in account A1: balance 20.00, required 25.00"
        );

        let err = AppError::CurrencyMismatch {
            account_number: "A1".into(),
            account_currency: 978,
            operation_currency: 840,
        };
        assert!(err.to_string().contains("978"));
        assert!(err.to_string().contains("840"));

        let err = AppError::AccountNotOpen {
            account_number: "A3".into(),
            status: AccountStatus::Closed,
        };
        assert_eq!(err.to_string(), "Account A3 is not OPEN (status: CLOSED)");
    }

    #[test]
    fn test_only_database_errors_are_internal() {
        assert!(AppError::AccountNotFound("A1".into()).is_client_error());
        assert!(AppError::InvalidAmount("zero".into()).is_client_error());
        assert!(!AppError::Database(anyhow::anyhow!("disk I/O error")).is_client_error());
    }
}
