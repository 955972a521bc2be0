mod memory;
mod repository;
mod sqlite;

pub use memory::*;
pub use repository::*;
pub use sqlite::*;

/// SQL migration for the accounts table
pub const MIGRATION_001_ACCOUNTS: &str = include_str!("migrations/001_accounts.sql");
