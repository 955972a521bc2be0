mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{EUR, balance_of, open, test_service};
use teller::application::{AccountService, AppError};
use teller::domain::OperationRequest;
use teller::storage::MemoryAccountStore;
use teller::Account;

const TASKS: usize = 20;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_debits_are_not_lost() -> Result<()> {
    let (service, _temp) = test_service().await?;
    open(&service, "A1", EUR, 0).await?;
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .apply_operation(&OperationRequest::debit("A1", EUR, 100))
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert_eq!(balance_of(&service, "A1").await?, 100 * TASKS as i64);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_credits_never_overdraw() -> Result<()> {
    let (service, _temp) = test_service().await?;
    // Enough for exactly half of the credits
    open(&service, "A1", EUR, 100 * (TASKS as i64 / 2)).await?;
    let service = Arc::new(service);

    let mut handles = Vec::new();
    for _ in 0..TASKS {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .apply_operation(&OperationRequest::credit("A1", EUR, 100))
                .await
        }));
    }

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => succeeded += 1,
            Err(AppError::InsufficientFunds { .. }) => rejected += 1,
            Err(other) => return Err(other.into()),
        }
    }

    assert_eq!(succeeded, TASKS / 2);
    assert_eq!(rejected, TASKS / 2);
    assert_eq!(balance_of(&service, "A1").await?, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_memory_store_serialises_operations() -> Result<()> {
    let store = MemoryAccountStore::with_accounts([Account::new("M1", EUR).with_balance(500)]);
    let service = Arc::new(AccountService::new(store));

    let mut handles = Vec::new();
    for i in 0..TASKS {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            let op = if i % 2 == 0 {
                OperationRequest::debit("M1", EUR, 300)
            } else {
                OperationRequest::credit("M1", EUR, 100)
            };
            service.apply_operation(&op).await
        }));
    }

    let mut credits_rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => {}
            Err(AppError::InsufficientFunds { .. }) => credits_rejected += 1,
            Err(other) => return Err(other.into()),
        }
    }

    let half = (TASKS / 2) as i64;
    let expected = 500 + 300 * half - 100 * (half - credits_rejected);
    assert_eq!(service.get_balance("M1").await?.balance, expected);
    assert!(expected >= 0);
    Ok(())
}
