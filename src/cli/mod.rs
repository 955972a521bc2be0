use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::{AccountService, AppError};
use crate::domain::{AccountStatus, AccountView, OperationRequest, OperationSign, format_cents, parse_cents};
use crate::telemetry::{self, LogFormat};

mod report;

pub use report::ErrorReport;

/// Teller - account status, balance inquiry and balance operations
#[derive(Parser)]
#[command(name = "teller")]
#[command(about = "Account balances with signed debit/credit operations")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "TELLER_DATABASE", default_value = "teller.db", global = true)]
    pub database: String,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, env = "TELLER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Account provisioning commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Show the status of an account
    Status {
        /// Account number
        account: String,
    },

    /// Show the balance inquiry for an account
    Balance {
        /// Account number
        account: String,
    },

    /// Apply a debit or credit operation to an account
    Apply {
        /// Amount (e.g., "10.00" or "10")
        amount: String,

        /// Target account number
        #[arg(long)]
        account: String,

        /// Numeric currency code of the operation (e.g., 978)
        #[arg(long)]
        currency: i64,

        /// debit adds to the balance, credit takes from it
        #[arg(long, value_enum)]
        sign: SignArg,
    },

    /// Export all accounts
    Export {
        /// Output format
        #[arg(value_enum)]
        format: FileFormat,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import (seed) accounts
    Import {
        /// Input format
        #[arg(value_enum)]
        format: FileFormat,

        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate without importing
        #[arg(long)]
        dry_run: bool,

        /// Skip accounts that already exist
        #[arg(long)]
        skip_existing: bool,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Provision a new account
    Create {
        /// Account number (must be unique)
        account: String,

        /// Numeric currency code (e.g., 978 for EUR)
        #[arg(short, long)]
        currency: i64,

        /// Opening balance
        #[arg(short, long, default_value = "0")]
        balance: String,

        /// Initial status
        #[arg(short, long, value_enum, default_value_t = StatusArg::Open)]
        status: StatusArg,
    },

    /// List all accounts
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignArg {
    Debit,
    Credit,
}

impl From<SignArg> for OperationSign {
    fn from(sign: SignArg) -> Self {
        match sign {
            SignArg::Debit => OperationSign::Debit,
            SignArg::Credit => OperationSign::Credit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Open,
    Closed,
}

impl From<StatusArg> for AccountStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Open => AccountStatus::Open,
            StatusArg::Closed => AccountStatus::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Csv,
    Json,
}

impl Commands {
    /// Short description of the request, carried in error reports.
    pub fn request_info(&self) -> String {
        match self {
            Commands::Init => "init".to_string(),
            Commands::Account(AccountCommands::Create { account, .. }) => {
                format!("account create {}", account)
            }
            Commands::Account(AccountCommands::List) => "account list".to_string(),
            Commands::Status { account } => format!("status {}", account),
            Commands::Balance { account } => format!("balance {}", account),
            Commands::Apply {
                amount,
                account,
                currency,
                sign,
            } => format!(
                "apply {} {} currency={} account={}",
                OperationSign::from(*sign),
                amount,
                currency,
                account
            ),
            Commands::Export { format, .. } => format!("export {:?}", format).to_lowercase(),
            Commands::Import { format, .. } => format!("import {:?}", format).to_lowercase(),
        }
    }
}

impl Cli {
    /// Set up logging, run the command and turn any failure into a report
    /// on stderr plus an exit code.
    pub async fn execute(self) -> ExitCode {
        telemetry::init(self.log_format, self.verbose);

        let json = self.json;
        let request_info = self.command.request_info();

        match self.run().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                let report = ErrorReport::new(&err, request_info);
                tracing::debug!(status = %report.status, message = %report.message, "Request failed");
                report.print(json);
                report.exit_code()
            }
        }
    }

    pub async fn run(self) -> Result<()> {
        let json = self.json;

        match self.command {
            Commands::Init => {
                AccountService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Account(account_cmd) => {
                let service = AccountService::connect(&self.database).await?;
                run_account_command(&service, account_cmd, json).await?;
            }

            Commands::Status { account } => {
                let service = AccountService::connect(&self.database).await?;
                let status = service.get_status(&account).await?;
                if json {
                    println!("{}", serde_json::to_string(&status)?);
                } else {
                    println!("{}", status);
                }
            }

            Commands::Balance { account } => {
                let service = AccountService::connect(&self.database).await?;
                let view = service.get_balance(&account).await?;
                print_view(&view, json)?;
            }

            Commands::Apply {
                amount,
                account,
                currency,
                sign,
            } => {
                let service = AccountService::connect(&self.database).await?;
                let amount = parse_amount(&amount)?;
                let operation = OperationRequest::new(account, currency, amount, sign.into());
                let view = service.apply_operation(&operation).await?;
                print_view(&view, json)?;
            }

            Commands::Export { format, output } => {
                let service = AccountService::connect(&self.database).await?;
                run_export_command(&service, format, output.as_deref()).await?;
            }

            Commands::Import {
                format,
                input,
                dry_run,
                skip_existing,
            } => {
                let service = AccountService::connect(&self.database).await?;
                run_import_command(&service, format, input.as_deref(), dry_run, skip_existing)
                    .await?;
            }
        }

        Ok(())
    }
}

fn parse_amount(input: &str) -> Result<i64, AppError> {
    parse_cents(input)
        .map_err(|e| AppError::InvalidAmount(format!("'{}': {}. Use '50.00' or '50'", input, e)))
}

fn print_view(view: &AccountView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
    } else {
        println!(
            "{}: {} (currency {}, {})",
            view.account_number,
            format_cents(view.balance),
            view.currency,
            view.status
        );
    }
    Ok(())
}

async fn run_account_command(
    service: &AccountService,
    cmd: AccountCommands,
    json: bool,
) -> Result<()> {
    match cmd {
        AccountCommands::Create {
            account,
            currency,
            balance,
            status,
        } => {
            let opening_balance = parse_amount(&balance)?;
            let view = service
                .open_account(&account, currency, opening_balance, status.into())
                .await?;
            if json {
                print_view(&view, json)?;
            } else {
                println!(
                    "Created account: {} (currency {}, {})",
                    view.account_number, view.currency, view.status
                );
            }
        }

        AccountCommands::List => {
            let accounts = service.list_accounts().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&accounts)?);
            } else if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                println!(
                    "{:<20} {:>8} {:>14} {:<8}",
                    "ACCOUNT", "CURRENCY", "BALANCE", "STATUS"
                );
                println!("{}", "-".repeat(53));
                for view in accounts {
                    println!(
                        "{:<20} {:>8} {:>14} {:<8}",
                        view.account_number,
                        view.currency,
                        format_cents(view.balance),
                        view.status
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &AccountService,
    format: FileFormat,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        FileFormat::Csv => exporter.export_csv(writer).await?,
        FileFormat::Json => exporter.export_json(writer).await?,
    };

    if output.is_some() {
        eprintln!("Exported {} accounts", count);
    }
    Ok(())
}

async fn run_import_command(
    service: &AccountService,
    format: FileFormat,
    input: Option<&str>,
    dry_run: bool,
    skip_existing: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions {
        dry_run,
        skip_existing,
    };

    let result = match format {
        FileFormat::Csv => importer.import_csv(reader, options).await?,
        FileFormat::Json => importer.import_json(reader, options).await?,
    };

    if dry_run {
        println!("Validation complete");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Skipped:  {}", result.skipped);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_arguments() {
        let cli = Cli::try_parse_from([
            "teller", "apply", "10.00", "--account", "A1", "--currency", "978", "--sign", "credit",
        ])
        .unwrap();

        match cli.command {
            Commands::Apply {
                ref amount,
                ref account,
                currency,
                sign,
            } => {
                assert_eq!(amount, "10.00");
                assert_eq!(account, "A1");
                assert_eq!(currency, 978);
                assert_eq!(OperationSign::from(sign), OperationSign::Credit);
            }
            _ => panic!("expected apply"),
        }
        assert_eq!(
            cli.command.request_info(),
            "apply CREDIT 10.00 currency=978 account=A1"
        );
    }

    #[test]
    fn test_database_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["teller", "balance", "A1", "--database", "other.db"])
            .unwrap();
        assert_eq!(cli.database, "other.db");

        let cli = Cli::try_parse_from(["teller", "-d", "first.db", "status", "A1"]).unwrap();
        assert_eq!(cli.database, "first.db");
    }

    #[test]
    fn test_unknown_sign_is_rejected() {
        let result = Cli::try_parse_from([
            "teller", "apply", "10", "--account", "A1", "--currency", "978", "--sign", "refund",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_amount_is_client_error() {
        let err = parse_amount("ten").unwrap_err();
        assert!(err.is_client_error());
        assert!(matches!(err, AppError::InvalidAmount(_)));
        assert_eq!(parse_amount("10.5").unwrap(), 1050);
    }

    #[test]
    fn test_account_create_defaults() {
        let cli = Cli::try_parse_from(["teller", "account", "create", "A1", "--currency", "978"])
            .unwrap();
        match cli.command {
            Commands::Account(AccountCommands::Create {
                balance, status, ..
            }) => {
                assert_eq!(balance, "0");
                assert_eq!(status, StatusArg::Open);
            }
            _ => panic!("expected account create"),
        }
    }
}
