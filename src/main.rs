//! PTSTMT Audit CLI
//!
//! Runs one audit over a fixed-width statement extract and prints a
//! per-category summary; `--out-dir` additionally writes each report
//! category as a CSV file.
//!
//! # Usage
//!
//! ```bash
//! ptstmt-audit PTSTMT.TXT --card-type REGULAR --out-dir reports/
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: set to `info` for progress lines or `debug` for
//!   per-batch logging

use chrono::NaiveDate;
use clap::Parser;
use log::{debug, info};
use ptstmt_audit::report::{CheckStatus, Validity};
use ptstmt_audit::{
    AuditReport, CardType, HeaderPolicy, ReportBatch, Result, RunConfig, RunSink, StatementAuditor,
};
use std::fs;
use std::path::PathBuf;
use std::process;

/// Audits a fixed-width card-statement extract against arithmetic and
/// structural business rules.
#[derive(Parser)]
#[clap(name = "ptstmt-audit", version, about, long_about = None)]
struct Args {
    /// Path to the statement extract (Latin-1, fixed-width lines)
    file: PathBuf,

    /// Card product type, which selects the minimum-payment rule
    #[clap(long, default_value = "REGULAR")]
    card_type: CardType,

    /// Inclusive start of the posting-date window
    #[clap(long, default_value = "2025-10-16")]
    from_date: NaiveDate,

    /// Inclusive end of the posting-date window
    #[clap(long, default_value = "2025-11-15")]
    until_date: NaiveDate,

    /// Open CORPORATE blocks on "01" records, as the legacy batch auditor did
    #[clap(long)]
    legacy_header_selection: bool,

    /// Directory to write one CSV file per report category
    #[clap(long)]
    out_dir: Option<PathBuf>,
}

/// Sink that forwards progress and batch readiness to the logger.
struct LogSink;

impl RunSink for LogSink {
    fn progress(&mut self, processed: u64, total: Option<u64>) {
        match total {
            Some(total) if total > 0 => {
                info!(
                    "processed {}/{} lines ({}%)",
                    processed,
                    total,
                    processed * 100 / total
                );
            }
            _ => info!("processed {} lines", processed),
        }
    }

    fn batch(&mut self, batch: ReportBatch) {
        debug!("{}: {} rows ready", batch.category(), batch.len());
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = RunConfig::new(args.card_type, args.from_date, args.until_date);
    if args.legacy_header_selection {
        config = config.with_header_policy(HeaderPolicy::ByCardType);
    }

    let auditor = StatementAuditor::new(config);
    let report = auditor.process_path(&args.file, &mut LogSink)?;

    print_summary(&report);

    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)?;
        report.write_csv_dir(dir)?;
        println!("reports written to {}", dir.display());
    }

    Ok(())
}

fn print_summary(report: &AuditReport) {
    let failed = report
        .validations
        .iter()
        .filter(|row| row.status == CheckStatus::Fail)
        .count();
    let invalid = |statuses: Vec<Validity>| {
        statuses
            .into_iter()
            .filter(|status| *status == Validity::Invalid)
            .count()
    };

    println!(
        "validations: {} rows, {} FAIL",
        report.validations.len(),
        failed
    );
    println!(
        "filtered_transactions: {} rows",
        report.filtered_transactions.len()
    );
    println!(
        "structure_results: {} rows, {} INVALID",
        report.structure_results.len(),
        invalid(report.structure_results.iter().map(|r| r.status).collect())
    );
    println!(
        "duplicate_transactions: {} rows",
        report.duplicate_transactions.len()
    );
    println!(
        "zero_amount_transactions: {} rows",
        report.zero_amount_transactions.len()
    );
    println!(
        "tot_payment_results: {} rows, {} INVALID",
        report.tot_payment_results.len(),
        invalid(report.tot_payment_results.iter().map(|r| r.status).collect())
    );
    println!(
        "sequence_results: {} rows, {} INVALID",
        report.sequence_results.len(),
        invalid(report.sequence_results.iter().map(|r| r.status).collect())
    );
}
