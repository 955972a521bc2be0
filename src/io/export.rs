use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::AccountService;
use crate::domain::{AccountView, format_cents};
use crate::storage::AccountStore;

/// Snapshot format version written by [`Exporter::export_json`].
pub const SNAPSHOT_VERSION: &str = "1";

/// Header shared by the CSV exporter and importer.
pub const CSV_HEADER: [&str; 4] = ["account_number", "currency", "balance", "status"];

/// Full account snapshot for export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub accounts: Vec<AccountView>,
}

/// Exporter for writing account data to various formats
pub struct Exporter<'a, S> {
    service: &'a AccountService<S>,
}

impl<'a, S: AccountStore> Exporter<'a, S> {
    pub fn new(service: &'a AccountService<S>) -> Self {
        Self { service }
    }

    /// Export accounts to CSV format
    pub async fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_accounts().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(CSV_HEADER)?;

        for account in &accounts {
            csv_writer.write_record([
                account.account_number.clone(),
                account.currency.to_string(),
                format_cents(account.balance),
                account.status.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(accounts.len())
    }

    /// Export accounts to a JSON snapshot
    pub async fn export_json<W: Write>(&self, writer: W) -> Result<usize> {
        let accounts = self.service.list_accounts().await?;
        let count = accounts.len();

        let snapshot = AccountSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            exported_at: Utc::now(),
            accounts,
        };

        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(count)
    }
}
