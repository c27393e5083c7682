//! Report rows, the final aggregate, and the streaming sink contract.
//!
//! Every business-rule outcome in the auditor is a row in one of seven
//! report categories. Rows stream out in small batches during the scan via
//! [`RunSink`] and are also collected into the final [`AuditReport`], which
//! can be written as one CSV file per category.

use crate::error::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

/// Header field checked by the block validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckField {
    #[serde(rename = "NEW_BAL")]
    NewBalance,
    #[serde(rename = "AVL_CR_LIMIT")]
    AvailableCredit,
    #[serde(rename = "PT_SH_MIN_PAYMENT")]
    MinPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Validity {
    #[serde(rename = "VALID")]
    Valid,
    #[serde(rename = "INVALID")]
    Invalid,
}

/// Yes/No report column, spelled the way reconciliation staff read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum YesNo {
    Yes,
    No,
}

impl From<bool> for YesNo {
    fn from(value: bool) -> YesNo {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

/// One recomputed-versus-declared comparison for a card block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceCheck {
    pub card: String,
    pub field: CheckField,
    pub expected: i64,
    pub actual: i64,
    pub status: CheckStatus,
}

/// A detail transaction posted outside the audit window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredTransaction {
    pub posting: NaiveDate,
    pub card: String,
    /// The full raw line, trailing whitespace stripped.
    pub line: String,
}

/// A detail transaction whose amount field read as zero, whether genuinely
/// zero or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZeroAmountTransaction {
    pub card: String,
    pub posting_date: NaiveDate,
    pub trx_detail: String,
    pub amount: i64,
    pub direction: String,
}

/// Record-type completeness for one customer section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureResult {
    pub customer: String,
    pub has_01: YesNo,
    pub has_02: YesNo,
    pub has_03: YesNo,
    pub has_04: YesNo,
    pub status: Validity,
    /// Missing type codes comma-joined in ascending order, or "-".
    pub missing: String,
}

/// A detail seen more than once under the same identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateTransaction {
    pub card: String,
    pub posting_date: NaiveDate,
    pub trx_detail: String,
    pub amount: i64,
    pub direction: String,
    pub count: u64,
}

/// Declared total payment versus observed credits for one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotPaymentResult {
    pub card: String,
    pub tot_payment: i64,
    pub has_cr: YesNo,
    pub cr_total: i64,
    pub status: Validity,
}

/// Record-sequence grammar verdict for one customer section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceResult {
    pub customer: String,
    /// Type codes joined with "->", e.g. "01->02->03->04".
    pub sequence: String,
    pub status: Validity,
}

/// Final aggregate of all seven report categories.
///
/// The three inline categories hold rows in file order; the four post-scan
/// categories hold rows in first-seen order. Two runs over the same input
/// with the same parameters produce equal reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub validations: Vec<BalanceCheck>,
    pub filtered_transactions: Vec<FilteredTransaction>,
    pub structure_results: Vec<StructureResult>,
    pub duplicate_transactions: Vec<DuplicateTransaction>,
    pub zero_amount_transactions: Vec<ZeroAmountTransaction>,
    pub tot_payment_results: Vec<TotPaymentResult>,
    pub sequence_results: Vec<SequenceResult>,
}

impl AuditReport {
    /// Writes one CSV file per category into `dir`, named after the
    /// category tags. Headers are always written, even for empty categories.
    pub fn write_csv_dir(&self, dir: &Path) -> Result<()> {
        write_csv(
            &dir.join("validations.csv"),
            &["card", "field", "expected", "actual", "status"],
            &self.validations,
        )?;
        write_csv(
            &dir.join("filtered_transactions.csv"),
            &["posting", "card", "line"],
            &self.filtered_transactions,
        )?;
        write_csv(
            &dir.join("structure_results.csv"),
            &[
                "customer", "has_01", "has_02", "has_03", "has_04", "status", "missing",
            ],
            &self.structure_results,
        )?;
        write_csv(
            &dir.join("duplicate_transactions.csv"),
            &[
                "card",
                "posting_date",
                "trx_detail",
                "amount",
                "direction",
                "count",
            ],
            &self.duplicate_transactions,
        )?;
        write_csv(
            &dir.join("zero_amount_transactions.csv"),
            &["card", "posting_date", "trx_detail", "amount", "direction"],
            &self.zero_amount_transactions,
        )?;
        write_csv(
            &dir.join("tot_payment_results.csv"),
            &["card", "tot_payment", "has_cr", "cr_total", "status"],
            &self.tot_payment_results,
        )?;
        write_csv(
            &dir.join("sequence_results.csv"),
            &["customer", "sequence", "status"],
            &self.sequence_results,
        )?;
        Ok(())
    }
}

/// Writes an explicit header record followed by serialized rows.
fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// One increment of newly-available rows, tagged by report category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportBatch {
    Validations(Vec<BalanceCheck>),
    FilteredTransactions(Vec<FilteredTransaction>),
    ZeroAmountTransactions(Vec<ZeroAmountTransaction>),
    StructureResults(Vec<StructureResult>),
    DuplicateTransactions(Vec<DuplicateTransaction>),
    TotPaymentResults(Vec<TotPaymentResult>),
    SequenceResults(Vec<SequenceResult>),
}

impl ReportBatch {
    /// The category tag consumers key tables on.
    pub fn category(&self) -> &'static str {
        match self {
            ReportBatch::Validations(_) => "validations",
            ReportBatch::FilteredTransactions(_) => "filtered_transactions",
            ReportBatch::ZeroAmountTransactions(_) => "zero_amount_transactions",
            ReportBatch::StructureResults(_) => "structure_results",
            ReportBatch::DuplicateTransactions(_) => "duplicate_transactions",
            ReportBatch::TotPaymentResults(_) => "tot_payment_results",
            ReportBatch::SequenceResults(_) => "sequence_results",
        }
    }

    /// Number of rows carried by this batch.
    pub fn len(&self) -> usize {
        match self {
            ReportBatch::Validations(rows) => rows.len(),
            ReportBatch::FilteredTransactions(rows) => rows.len(),
            ReportBatch::ZeroAmountTransactions(rows) => rows.len(),
            ReportBatch::StructureResults(rows) => rows.len(),
            ReportBatch::DuplicateTransactions(rows) => rows.len(),
            ReportBatch::TotPaymentResults(rows) => rows.len(),
            ReportBatch::SequenceResults(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Receiver for progress counters and result batches during a scan.
///
/// The engine calls this synchronously inline and never waits on the
/// consumer, so implementations should not block. Both methods default to
/// no-ops; implement only what the caller cares about.
pub trait RunSink {
    /// Called once at the start of the scan, every 1 000 lines, and once at
    /// the end. `total` is `None` when the caller could not count lines up
    /// front.
    fn progress(&mut self, processed: u64, total: Option<u64>) {
        let _ = (processed, total);
    }

    /// Called with each batch of newly-available rows. The three inline
    /// categories arrive incrementally; the four post-scan categories
    /// arrive once each, in full, even when empty.
    fn batch(&mut self, batch: ReportBatch) {
        let _ = batch;
    }
}

/// Sink that discards everything, for callers that only want the final
/// report.
pub struct NullSink;

impl RunSink for NullSink {}
