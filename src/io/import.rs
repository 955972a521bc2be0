use anyhow::Result;
use std::collections::HashSet;
use std::io::Read;

use crate::application::{AccountService, AppError, check_new_account};
use crate::domain::{AccountStatus, AccountView, CurrencyCode, parse_cents};
use crate::io::export::AccountSnapshot;
use crate::storage::AccountStore;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate every row without writing anything
    pub dry_run: bool,
    /// Count rows for existing accounts as skipped instead of failed
    pub skip_existing: bool,
}

/// Importer for seeding accounts into the store
pub struct Importer<'a, S> {
    service: &'a AccountService<S>,
}

impl<'a, S: AccountStore> Importer<'a, S> {
    pub fn new(service: &'a AccountService<S>) -> Self {
        Self { service }
    }

    /// Import accounts from CSV with an
    /// `account_number,currency,balance,status` header.
    pub async fn import_csv<R: Read>(&self, reader: R, options: ImportOptions) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut result = ImportResult::default();
        let mut seen = HashSet::new();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            match parse_record(&record) {
                Ok(view) => {
                    self.import_one(view, line, &options, &mut seen, &mut result)
                        .await
                }
                Err(error) => result.errors.push(ImportError { line, ..error }),
            }
        }

        Ok(result)
    }

    /// Import accounts from a JSON snapshot written by the exporter.
    /// Line numbers in errors are 1-based positions in the `accounts` array.
    pub async fn import_json<R: Read>(&self, reader: R, options: ImportOptions) -> Result<ImportResult> {
        let snapshot: AccountSnapshot = serde_json::from_reader(reader)?;
        let mut result = ImportResult::default();
        let mut seen = HashSet::new();

        for (index, view) in snapshot.accounts.into_iter().enumerate() {
            self.import_one(view, index + 1, &options, &mut seen, &mut result)
                .await;
        }

        Ok(result)
    }

    async fn import_one(
        &self,
        view: AccountView,
        line: usize,
        options: &ImportOptions,
        seen: &mut HashSet<String>,
        result: &mut ImportResult,
    ) {
        let outcome = if options.dry_run {
            self.check_account(&view, seen).await
        } else {
            self.service
                .open_account(&view.account_number, view.currency, view.balance, view.status)
                .await
                .map(|_| ())
        };

        match outcome {
            Ok(()) => result.imported += 1,
            Err(AppError::AccountAlreadyExists(_)) if options.skip_existing => result.skipped += 1,
            Err(e) => result.errors.push(ImportError {
                line,
                field: None,
                error: format!("Account creation failed: {}", e),
            }),
        }
    }

    /// Everything `open_account` would check, without writing. `seen` stands
    /// in for the rows a real run would already have inserted.
    async fn check_account(
        &self,
        view: &AccountView,
        seen: &mut HashSet<String>,
    ) -> Result<(), AppError> {
        let account_number = check_new_account(&view.account_number, view.balance)?;
        if seen.contains(account_number)
            || self.service.store().find(account_number).await?.is_some()
        {
            return Err(AppError::AccountAlreadyExists(account_number.to_string()));
        }
        seen.insert(account_number.to_string());
        Ok(())
    }
}

fn parse_record(record: &csv::StringRecord) -> Result<AccountView, ImportError> {
    let field_error = |field: &str, error: String| ImportError {
        line: 0,
        field: Some(field.to_string()),
        error,
    };

    let account_number = record.get(0).unwrap_or("").trim();
    if account_number.is_empty() {
        return Err(field_error("account_number", "must be not empty".to_string()));
    }

    let currency_str = record.get(1).unwrap_or("").trim();
    let currency = currency_str
        .parse::<CurrencyCode>()
        .map_err(|_| field_error("currency", format!("Invalid currency code: {}", currency_str)))?;

    let balance_str = record.get(2).unwrap_or("");
    let balance = parse_cents(balance_str)
        .map_err(|e| field_error("balance", format!("Invalid balance: {}", e)))?;

    // A missing status column means the account is open
    let status_str = record.get(3).unwrap_or("").trim();
    let status = if status_str.is_empty() {
        AccountStatus::Open
    } else {
        AccountStatus::from_str(status_str)
            .ok_or_else(|| field_error("status", format!("Invalid status: {}", status_str)))?
    };

    Ok(AccountView {
        account_number: account_number.to_string(),
        currency,
        balance,
        status,
    })
}
