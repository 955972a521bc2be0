//! Pure checks and balance arithmetic applied to a loaded account.
//!
//! Nothing here touches storage; the service decides when to persist.

use crate::domain::{Account, Cents, OperationRequest, OperationSign};

use super::AppError;

/// Fails unless the account is OPEN.
pub fn check_status(account: &Account) -> Result<(), AppError> {
    if !account.is_open() {
        return Err(AppError::AccountNotOpen {
            account_number: account.account_number.clone(),
            status: account.status,
        });
    }
    Ok(())
}

/// Fails unless the operation is in the account's currency.
pub fn check_currency(account: &Account, operation: &OperationRequest) -> Result<(), AppError> {
    if operation.currency != account.currency {
        return Err(AppError::CurrencyMismatch {
            account_number: account.account_number.clone(),
            account_currency: account.currency,
            operation_currency: operation.currency,
        });
    }
    Ok(())
}

/// Runs both checks. Status is checked first, so a closed account with the
/// wrong currency reports `AccountNotOpen`.
pub fn validate(account: &Account, operation: &OperationRequest) -> Result<(), AppError> {
    check_status(account)?;
    check_currency(account, operation)
}

/// Computes the balance after applying `amount` with `sign`.
///
/// A CREDIT may take the balance down to exactly zero but never below it.
/// `amount` is expected to be positive; the service rejects anything else
/// before getting here.
pub fn transition(
    account_number: &str,
    balance: Cents,
    sign: OperationSign,
    amount: Cents,
) -> Result<Cents, AppError> {
    match sign {
        OperationSign::Debit => {
            balance
                .checked_add(amount)
                .ok_or_else(|| AppError::BalanceOverflow {
                    account_number: account_number.to_string(),
                    sign,
                    amount,
                })
        }
        OperationSign::Credit => {
            if balance < amount {
                return Err(AppError::InsufficientFunds {
                    account_number: account_number.to_string(),
                    balance,
                    required: amount,
                });
            }
            balance
                .checked_sub(amount)
                .ok_or_else(|| AppError::BalanceOverflow {
                    account_number: account_number.to_string(),
                    sign,
                    amount,
                })
        }
    }
}
