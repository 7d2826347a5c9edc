//! # goldloan
//!
//! Command-line front end for the gold loan application record.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  goldloan [--config FILE] [--storage-dir DIR] <command>                 │
//! │                                                                         │
//! │  config ──► FileStorage(dir) ──► ApplicationSlot ──► FormSession        │
//! │                                                                         │
//! │  import <file>   hydrate, recompute, save                               │
//! │  show            stored record (JSON) + violations                      │
//! │  validate        violations only, exit 1 when any                       │
//! │  submit          submit, exit 1 with the notice when rejected           │
//! │  certificate     certificate table and column totals                    │
//! │  reset           save a blank record                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use goldloan_core::{ApplicationData, Certificate, ValidationReport};
use goldloan_store::{AppConfig, ApplicationSlot, FileStorage, FormSession, StoreError};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "goldloan", about = "Gold loan application intake")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "GOLDLOAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Storage directory, overriding the config
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a JSON document into the application slot
    Import { file: PathBuf },
    /// Print the stored application and its violations
    Show,
    /// Check the stored application
    Validate,
    /// Submit the stored application
    Submit,
    /// Print the certificate for the stored application
    Certificate,
    /// Replace the stored application with a blank one
    Reset,
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config).context("loading configuration")?;
    if let Some(dir) = cli.storage_dir {
        config.storage.dir = Some(dir);
    }

    let dir = config.storage_dir();
    info!(dir = %dir.display(), key = %config.storage.slot_key, "Using application slot");
    let slot = ApplicationSlot::with_key(FileStorage::new(dir), config.storage.slot_key.clone());

    match cli.command {
        Command::Import { file } => {
            let document = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let record = ApplicationData::from_document(&document)
                .with_context(|| format!("parsing {}", file.display()))?;

            let mut session = FormSession::open(slot, &config.form);
            if !session.replace(record) {
                bail!("the application could not be saved");
            }
            print_summary(session.record());
            Ok(ExitCode::SUCCESS)
        }

        Command::Show => {
            let session = FormSession::open(slot, &config.form);
            println!("{}", serde_json::to_string_pretty(session.record())?);
            print_report(&session.report());
            Ok(ExitCode::SUCCESS)
        }

        Command::Validate => {
            let session = FormSession::open(slot, &config.form);
            let report = session.report();
            print_report(&report);
            Ok(exit_code(report.is_valid()))
        }

        Command::Submit => {
            let mut session = FormSession::open(slot, &config.form);
            match session.submit() {
                Ok(()) => {
                    println!("Application submitted.");
                    print_summary(session.record());
                    Ok(ExitCode::SUCCESS)
                }
                Err(StoreError::SubmissionRejected(report)) => {
                    eprintln!("{}", goldloan_core::SUBMIT_REJECTED_NOTICE);
                    print_report(&report);
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }

        Command::Certificate => {
            let document = slot
                .read_document()
                .ok_or_else(|| anyhow!("no stored application"))?;
            let certificate = Certificate::from_document(&document)
                .ok_or_else(|| anyhow!("the stored application is not readable"))?
                .issued(chrono::Utc::now());
            print_certificate(&certificate);
            Ok(ExitCode::SUCCESS)
        }

        Command::Reset => {
            let mut session = FormSession::open(slot, &config.form);
            if !session.replace(config.form.blank_record()) {
                bail!("the application could not be saved");
            }
            println!("Application reset.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initializes the tracing subscriber. Logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,goldloan=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// =============================================================================
// Output
// =============================================================================

fn print_report(report: &ValidationReport) {
    if report.is_valid() {
        println!("No violations.");
        return;
    }

    println!("{} violation(s):", report.len());
    for violation in &report.violations {
        println!("  {}", violation);
    }
}

fn print_summary(record: &ApplicationData) {
    let section = &record.calculation_section;
    println!("Ornaments:        {}", record.ornaments.len());
    println!("Total weight:     {:.4} g", section.total_weight);
    println!("Total value:      {:.2}", section.total_value);
    println!("Eligible loan:    {:.2}", section.eligible_loan);
    println!("Coins weight:     {:.4} g", section.coins_weight);
    println!(
        "Weight in range:  {}",
        if section.is_weight_valid { "yes" } else { "no" }
    );
}

fn print_certificate(certificate: &Certificate) {
    let borrower = &certificate.borrower;
    println!("GOLD APPRAISAL CERTIFICATE");
    if let Some(at) = certificate.issued_at {
        println!("Issued: {}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("Borrower: {}  PAN: {}", borrower.full_name, borrower.pan);
    println!();
    println!(
        "{:<12} {:>9} {:>9} {:>9} {:>7} {:>11} {:>9} {:>11}  {}",
        "Item", "Gross", "Stone", "Net", "Purity", "Equivalent", "Rate", "Value", "Hallmark"
    );
    for row in &certificate.rows {
        println!(
            "{:<12} {:>9.2} {:>9.2} {:>9.2} {:>7.2} {:>11.4} {:>9.2} {:>11.2}  {}",
            row.gold_items,
            row.gross_weight,
            row.stone_weight,
            row.net_weight,
            row.purity,
            row.equivalent_weight,
            row.rate,
            row.market_value,
            row.hallmark
        );
    }
    println!(
        "{:<12} {:>9.2} {:>9.2} {:>9.2} {:>7} {:>11.4} {:>9} {:>11.2}",
        "Total",
        certificate.total_gross_weight(),
        certificate.total_stone_weight(),
        certificate.total_net_weight(),
        "",
        certificate.total_equivalent_weight(),
        "",
        certificate.total_market_value()
    );
    println!();
    println!(
        "LTV: {}%  Eligible loan: {:.2}",
        certificate.loan_summary.ltv_ratio, certificate.calculation.eligible_loan
    );
}
