//! Single-pass streaming statement auditor.
//!
//! Walks the extract once, line by line, reconstructing card blocks and
//! validating each as it closes, while accumulating the cross-cutting
//! aggregates (duplicate keys, customer record-type traces, per-card
//! payment lists) that can only be reduced after the whole file has been
//! seen. Inline findings stream out through the caller's sink in small
//! batches; the four reduced reports are emitted once at end of stream.

use crate::block::OpenBlock;
use crate::config::RunConfig;
use crate::error::{AuditError, Result};
use crate::layout::{self, span};
use crate::record::{BlockHeader, DetailRecord, RecordType, TypeSet};
use crate::report::{
    AuditReport, BalanceCheck, DuplicateTransaction, FilteredTransaction, ReportBatch, RunSink,
    SequenceResult, StructureResult, TotPaymentResult, Validity, ZeroAmountTransaction,
};
use crate::sequence;
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Pending inline rows are flushed once any category reaches this many.
const BATCH_SIZE: usize = 5;

/// Lines between progress reports (and opportunistic batch flushes).
const PROGRESS_INTERVAL: u64 = 1000;

/// Cooperative cancellation flag, checked once per record.
///
/// Clones share one flag, so a consumer thread can cancel a scan running
/// elsewhere. Cancellation aborts the run with [`AuditError::Cancelled`];
/// rows already streamed to the sink are not retracted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Identity of a transaction for duplicate detection: two detail records
/// agreeing on all five fields are duplicates wherever they sit in the file.
type DupKey = (String, NaiveDate, String, i64, String);

/// Declared total payment plus the transactions posted while the card's
/// block was open. Re-heading a card overwrites both.
struct PaymentAggregate {
    total_payment: i64,
    transactions: Vec<(String, i64)>,
}

/// Buffers for the three inline report categories between flushes.
#[derive(Default)]
struct PendingBatches {
    validations: Vec<BalanceCheck>,
    filtered: Vec<FilteredTransaction>,
    zero: Vec<ZeroAmountTransaction>,
}

impl PendingBatches {
    fn any_full(&self) -> bool {
        self.validations.len() >= BATCH_SIZE
            || self.filtered.len() >= BATCH_SIZE
            || self.zero.len() >= BATCH_SIZE
    }

    /// Sends every non-empty buffer to the sink and clears it.
    fn flush(&mut self, sink: &mut dyn RunSink) {
        if !self.validations.is_empty() {
            sink.batch(ReportBatch::Validations(std::mem::take(
                &mut self.validations,
            )));
        }
        if !self.filtered.is_empty() {
            sink.batch(ReportBatch::FilteredTransactions(std::mem::take(
                &mut self.filtered,
            )));
        }
        if !self.zero.is_empty() {
            sink.batch(ReportBatch::ZeroAmountTransactions(std::mem::take(
                &mut self.zero,
            )));
        }
    }
}

/// All mutable state for one scan. Function-local to `process_lines`, so
/// one auditor value can run files from several threads at once.
///
/// `HashMap` iteration order is arbitrary, so each map keeps a companion
/// vector of keys in first-seen order; the reducers walk the vectors.
#[derive(Default)]
struct RunState {
    report: AuditReport,
    pending: PendingBatches,

    current_block: Option<OpenBlock>,
    current_customer: Option<String>,

    customer_order: Vec<String>,
    customer_types: HashMap<String, TypeSet>,
    customer_traces: HashMap<String, Vec<RecordType>>,

    dup_order: Vec<DupKey>,
    dup_counts: HashMap<DupKey, u64>,

    card_order: Vec<String>,
    card_payments: HashMap<String, PaymentAggregate>,
}

impl RunState {
    /// Registers a record type in the current customer's completeness set
    /// and ordered trace. No-op before the first customer record.
    fn trace_record(&mut self, record_type: RecordType) {
        if let Some(customer) = &self.current_customer {
            if let Some(set) = self.customer_types.get_mut(customer) {
                set.insert(record_type);
            }
            if let Some(trace) = self.customer_traces.get_mut(customer) {
                trace.push(record_type);
            }
        }
    }
}

/// The streaming statement auditor.
///
/// Holds only the immutable run parameters; every `process_*` call owns its
/// state for the duration of the scan, so the auditor is reentrant.
pub struct StatementAuditor {
    config: RunConfig,
    cancel: Option<CancelToken>,
}

impl StatementAuditor {
    pub fn new(config: RunConfig) -> StatementAuditor {
        StatementAuditor {
            config,
            cancel: None,
        }
    }

    /// Attaches a cancellation token checked between records.
    pub fn with_cancel_token(mut self, token: CancelToken) -> StatementAuditor {
        self.cancel = Some(token);
        self
    }

    /// Audits a file on disk.
    ///
    /// Counts lines first so progress reports carry a denominator, then
    /// streams the file through [`Self::process_lines`].
    pub fn process_path(&self, path: &Path, sink: &mut dyn RunSink) -> Result<AuditReport> {
        let total_lines = count_lines(path)?;
        let file = File::open(path)?;
        self.process_lines(BufReader::new(file), Some(total_lines), sink)
    }

    /// Audits one stream of newline-terminated Latin-1 lines.
    ///
    /// `total_lines` is only a progress denominator; pass `None` when the
    /// stream cannot be pre-counted. The returned report holds all seven
    /// categories in full; the sink sees the same rows incrementally.
    pub fn process_lines<R: BufRead>(
        &self,
        mut reader: R,
        total_lines: Option<u64>,
        sink: &mut dyn RunSink,
    ) -> Result<AuditReport> {
        let target_header = self.config.target_header();
        let mut state = RunState::default();
        let mut processed: u64 = 0;
        let mut line = Vec::new();

        sink.progress(0, total_lines);

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if let Some(token) = &self.cancel {
                if token.is_cancelled() {
                    return Err(AuditError::Cancelled { processed });
                }
            }
            processed += 1;
            if processed % PROGRESS_INTERVAL == 0 {
                sink.progress(processed, total_lines);
                state.pending.flush(sink);
            }

            while line.last() == Some(&b'\n') || line.last() == Some(&b'\r') {
                line.pop();
            }
            let record_type = RecordType::classify(&line);

            // The customer branch stands alone: when the configured target
            // header is "01", the same line also opens a block below.
            if record_type == Some(RecordType::CustomerOpen) {
                let customer = layout::field_str(&line, span::CUSTOMER);
                if !state.customer_types.contains_key(&customer) {
                    state.customer_order.push(customer.clone());
                    state.customer_types.insert(customer.clone(), TypeSet::default());
                    state.customer_traces.insert(customer.clone(), Vec::new());
                }
                state.current_customer = Some(customer);
                state.trace_record(RecordType::CustomerOpen);
            }

            if record_type == Some(target_header) {
                self.open_block(&line, target_header, &mut state);
            } else if record_type == Some(RecordType::Detail) {
                self.process_detail(&line, processed, &mut state)?;
            } else if record_type == Some(RecordType::BlockClose) {
                state.trace_record(RecordType::BlockClose);
            }

            if state.pending.any_full() {
                state.pending.flush(sink);
            }
        }

        // The trailing block is never silently dropped.
        if let Some(block) = state.current_block.take() {
            self.close_block(block, &mut state);
        }
        state.pending.flush(sink);
        sink.progress(processed, total_lines);

        self.reduce_structure(&mut state, sink);
        self.reduce_duplicates(&mut state, sink);
        self.reduce_payment_totals(&mut state, sink);
        self.reduce_sequences(&mut state, sink);

        info!(
            "audit complete: {} lines, {} balance checks, {} customers, {} cards",
            processed,
            state.report.validations.len(),
            state.customer_order.len(),
            state.card_order.len()
        );

        Ok(state.report)
    }

    /// Closes any open block, then opens a new one from this header line.
    fn open_block(&self, line: &[u8], target_header: RecordType, state: &mut RunState) {
        if let Some(block) = state.current_block.take() {
            self.close_block(block, state);
        }

        let header = BlockHeader::parse(line);
        let aggregate = PaymentAggregate {
            total_payment: header.total_payment,
            transactions: Vec::new(),
        };
        // A re-headed card keeps its first-seen report position but the
        // latest declared total, and starts a fresh transaction list.
        if state
            .card_payments
            .insert(header.card.clone(), aggregate)
            .is_none()
        {
            state.card_order.push(header.card.clone());
        }

        // Only a true "02" header counts toward the customer trace; under
        // the legacy policy the opening "01" was traced above already.
        if target_header == RecordType::CardHeader {
            state.trace_record(RecordType::CardHeader);
        }

        state.current_block = Some(OpenBlock::new(header));
    }

    /// Validates a completed block and queues its three rows.
    fn close_block(&self, block: OpenBlock, state: &mut RunState) {
        debug!(
            "closing block for card {}: debit {} credit {}",
            block.header.card, block.stats.debit, block.stats.credit
        );
        let checks = block.validate(self.config.card_type);
        state.report.validations.extend(checks.iter().cloned());
        state.pending.validations.extend(checks);
    }

    /// Handles one "03" detail line: window filter, duplicate key, payment
    /// aggregate, zero-amount capture, running totals, customer trace.
    fn process_detail(&self, line: &[u8], line_number: u64, state: &mut RunState) -> Result<()> {
        let detail = DetailRecord::parse(line).map_err(|source| AuditError::Format {
            line: line_number,
            source,
        })?;

        if !self.config.in_window(detail.posting_date) {
            let raw = layout::decode_latin1(line);
            let row = FilteredTransaction {
                posting: detail.posting_date,
                card: detail.card.clone(),
                line: raw.trim_end().to_string(),
            };
            state.report.filtered_transactions.push(row.clone());
            state.pending.filtered.push(row);
        }

        let key: DupKey = (
            detail.card.clone(),
            detail.posting_date,
            detail.detail.clone(),
            detail.amount,
            detail.direction.clone(),
        );
        let count = state.dup_counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            state.dup_order.push(key);
        }
        *count += 1;

        // Payments are attributed to the card of the open block, not to
        // the detail line's own card field.
        if let Some(block) = &state.current_block {
            if let Some(aggregate) = state.card_payments.get_mut(&block.header.card) {
                aggregate
                    .transactions
                    .push((detail.direction.clone(), detail.amount));
            }
        }

        // Malformed amounts decode to zero and land here too; the report
        // is where that leniency becomes visible.
        if detail.amount == 0 {
            let row = ZeroAmountTransaction {
                card: detail.card.clone(),
                posting_date: detail.posting_date,
                trx_detail: detail.detail.clone(),
                amount: detail.amount,
                direction: detail.direction.clone(),
            };
            state.report.zero_amount_transactions.push(row.clone());
            state.pending.zero.push(row);
        }

        if let Some(block) = &mut state.current_block {
            block.stats.add(&detail.direction, detail.amount);
        }

        state.trace_record(RecordType::Detail);
        Ok(())
    }

    /// Record-type completeness per customer, in first-seen order.
    fn reduce_structure(&self, state: &mut RunState, sink: &mut dyn RunSink) {
        let rows: Vec<StructureResult> = state
            .customer_order
            .iter()
            .map(|customer| {
                let set = state.customer_types[customer];
                let missing = set.missing();
                StructureResult {
                    customer: customer.clone(),
                    has_01: set.contains(RecordType::CustomerOpen).into(),
                    has_02: set.contains(RecordType::CardHeader).into(),
                    has_03: set.contains(RecordType::Detail).into(),
                    has_04: set.contains(RecordType::BlockClose).into(),
                    status: if missing.is_empty() {
                        Validity::Valid
                    } else {
                        Validity::Invalid
                    },
                    missing: if missing.is_empty() {
                        "-".to_string()
                    } else {
                        missing.join(", ")
                    },
                }
            })
            .collect();

        state.report.structure_results = rows.clone();
        sink.batch(ReportBatch::StructureResults(rows));
    }

    /// One row per key seen more than once; singletons are not reported.
    fn reduce_duplicates(&self, state: &mut RunState, sink: &mut dyn RunSink) {
        let rows: Vec<DuplicateTransaction> = state
            .dup_order
            .iter()
            .filter_map(|key| {
                let count = state.dup_counts[key];
                (count > 1).then(|| DuplicateTransaction {
                    card: key.0.clone(),
                    posting_date: key.1,
                    trx_detail: key.2.clone(),
                    amount: key.3,
                    direction: key.4.clone(),
                    count,
                })
            })
            .collect();

        state.report.duplicate_transactions = rows.clone();
        sink.batch(ReportBatch::DuplicateTransactions(rows));
    }

    /// A card that received credits must declare a non-zero total payment.
    fn reduce_payment_totals(&self, state: &mut RunState, sink: &mut dyn RunSink) {
        let rows: Vec<TotPaymentResult> = state
            .card_order
            .iter()
            .map(|card| {
                let aggregate = &state.card_payments[card];
                let credits: Vec<i64> = aggregate
                    .transactions
                    .iter()
                    .filter(|(direction, _)| direction == "CR")
                    .map(|&(_, amount)| amount)
                    .collect();
                let has_cr = !credits.is_empty();
                TotPaymentResult {
                    card: card.clone(),
                    tot_payment: aggregate.total_payment,
                    has_cr: has_cr.into(),
                    cr_total: credits.iter().sum(),
                    status: if has_cr && aggregate.total_payment == 0 {
                        Validity::Invalid
                    } else {
                        Validity::Valid
                    },
                }
            })
            .collect();

        state.report.tot_payment_results = rows.clone();
        sink.batch(ReportBatch::TotPaymentResults(rows));
    }

    /// Grammar verdict over each customer's ordered record-type trace.
    fn reduce_sequences(&self, state: &mut RunState, sink: &mut dyn RunSink) {
        let rows: Vec<SequenceResult> = state
            .customer_order
            .iter()
            .map(|customer| {
                let trace = &state.customer_traces[customer];
                SequenceResult {
                    customer: customer.clone(),
                    sequence: sequence::arrow_join(trace),
                    status: if sequence::is_valid(trace) {
                        Validity::Valid
                    } else {
                        Validity::Invalid
                    },
                }
            })
            .collect();

        state.report.sequence_results = rows.clone();
        sink.batch(ReportBatch::SequenceResults(rows));
    }
}

/// Counts newline-delimited lines the way the scan will see them; a final
/// unterminated line still counts.
fn count_lines(path: &Path) -> Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut count = 0u64;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(count);
        }
        count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CardType, HeaderPolicy};
    use crate::report::{CheckField, CheckStatus, NullSink, YesNo};
    use std::io::Cursor;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> RunConfig {
        RunConfig::new(CardType::Regular, date(2025, 10, 16), date(2025, 11, 15))
    }

    fn put(line: &mut [u8], start: usize, value: &str) {
        let from = start - 1;
        line[from..from + value.len()].copy_from_slice(value.as_bytes());
    }

    fn customer_line(customer: &str) -> Vec<u8> {
        let mut line = vec![b' '; 900];
        put(&mut line, 1, "01");
        put(&mut line, 3, customer);
        line
    }

    #[allow(clippy::too_many_arguments)]
    fn header_line(
        card: &str,
        prev: &str,
        interest: &str,
        cr_limit: &str,
        instl: &str,
        new_bal: &str,
        min_due: &str,
        avl: &str,
        tot_payment: &str,
    ) -> Vec<u8> {
        let mut line = vec![b' '; 900];
        put(&mut line, 1, "02");
        put(&mut line, 28, card);
        put(&mut line, 324, prev);
        put(&mut line, 399, interest);
        put(&mut line, 279, cr_limit);
        put(&mut line, 891, instl);
        put(&mut line, 414, new_bal);
        put(&mut line, 264, min_due);
        put(&mut line, 294, avl);
        put(&mut line, 354, tot_payment);
        line
    }

    fn detail_line(card: &str, yyyymmdd: &str, detail: &str, amount: &str, dir: &str) -> Vec<u8> {
        let mut line = vec![b' '; 900];
        put(&mut line, 1, "03");
        put(&mut line, 28, card);
        put(&mut line, 82, yyyymmdd);
        put(&mut line, 90, detail);
        put(&mut line, 149, amount);
        put(&mut line, 163, dir);
        line
    }

    fn trailer_line() -> Vec<u8> {
        let mut line = vec![b' '; 900];
        put(&mut line, 1, "04");
        line
    }

    fn file_of(lines: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for line in lines {
            bytes.extend_from_slice(line);
            bytes.push(b'\n');
        }
        bytes
    }

    fn audit(config: RunConfig, lines: &[Vec<u8>]) -> AuditReport {
        StatementAuditor::new(config)
            .process_lines(Cursor::new(file_of(lines)), None, &mut NullSink)
            .unwrap()
    }

    #[test]
    fn test_block_closed_by_next_header_and_at_eof() {
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                header_line("CARD A", "1000", "0", "100000", "0", "1000", "50000", "99000", "0"),
                header_line("CARD B", "2000", "0", "100000", "0", "2000", "50000", "98000", "0"),
            ],
        );

        // Two blocks, three checks each, in file order.
        assert_eq!(report.validations.len(), 6);
        assert_eq!(report.validations[0].card, "CARD A");
        assert_eq!(report.validations[3].card, "CARD B");
        assert!(report
            .validations
            .iter()
            .all(|check| check.status == CheckStatus::Pass));
    }

    #[test]
    fn test_details_feed_the_open_block() {
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                header_line("CARD A", "1000", "0", "100000", "0", "1500", "50000", "98500", "300"),
                detail_line("CARD A", "20251101", "POS PURCHASE", "800", "DR"),
                detail_line("CARD A", "20251102", "PAYMENT", "300", "CR"),
                trailer_line(),
            ],
        );

        let new_bal = &report.validations[0];
        assert_eq!(new_bal.field, CheckField::NewBalance);
        assert_eq!(new_bal.expected, 1500);
        assert_eq!(new_bal.status, CheckStatus::Pass);
    }

    #[test]
    fn test_detail_before_any_header_still_counts_globally() {
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                detail_line("CARD X", "20251101", "ORPHAN", "0", "DR"),
                detail_line("CARD X", "20250101", "OLD", "100", "DR"),
            ],
        );

        // No block: no validations and no payment rows, but the global
        // captures still fire.
        assert!(report.validations.is_empty());
        assert!(report.tot_payment_results.is_empty());
        assert_eq!(report.zero_amount_transactions.len(), 1);
        assert_eq!(report.filtered_transactions.len(), 1);
    }

    #[test]
    fn test_duplicates_counted_across_blocks() {
        let dup = || detail_line("CARD A", "20251101", "SAME THING", "500", "DR");
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                header_line("CARD A", "0", "0", "0", "0", "0", "0", "0", "0"),
                dup(),
                detail_line("CARD A", "20251101", "OTHER", "500", "DR"),
                header_line("CARD B", "0", "0", "0", "0", "0", "0", "0", "0"),
                dup(),
                dup(),
            ],
        );

        assert_eq!(report.duplicate_transactions.len(), 1);
        let row = &report.duplicate_transactions[0];
        assert_eq!(row.count, 3);
        assert_eq!(row.trx_detail, "SAME THING");
    }

    #[test]
    fn test_direction_distinguishes_duplicate_keys() {
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                detail_line("CARD A", "20251101", "SAME", "500", "DR"),
                detail_line("CARD A", "20251101", "SAME", "500", "CR"),
            ],
        );
        assert!(report.duplicate_transactions.is_empty());
    }

    #[test]
    fn test_payment_totals_flag_missing_declared_total() {
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                header_line("CARD A", "0", "0", "0", "0", "0", "0", "0", "0"),
                detail_line("CARD A", "20251101", "PAYMENT", "500", "CR"),
                header_line("CARD B", "0", "0", "0", "0", "0", "0", "0", "700"),
                detail_line("CARD B", "20251101", "PAYMENT", "700", "CR"),
                header_line("CARD C", "0", "0", "0", "0", "0", "0", "0", "0"),
                detail_line("CARD C", "20251101", "PURCHASE", "900", "DR"),
            ],
        );

        let rows = &report.tot_payment_results;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].card, "CARD A");
        assert_eq!(rows[0].status, Validity::Invalid);
        assert_eq!(rows[0].cr_total, 500);
        assert_eq!(rows[1].status, Validity::Valid);
        assert_eq!(rows[2].status, Validity::Valid);
        assert_eq!(rows[2].has_cr, YesNo::No);
    }

    #[test]
    fn test_reheaded_card_keeps_position_and_latest_total() {
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                header_line("CARD A", "0", "0", "0", "0", "0", "0", "0", "100"),
                detail_line("CARD A", "20251101", "FIRST", "100", "CR"),
                header_line("CARD B", "0", "0", "0", "0", "0", "0", "0", "0"),
                header_line("CARD A", "0", "0", "0", "0", "0", "0", "0", "0"),
                detail_line("CARD A", "20251102", "SECOND", "200", "CR"),
            ],
        );

        let rows = &report.tot_payment_results;
        assert_eq!(rows[0].card, "CARD A");
        assert_eq!(rows[1].card, "CARD B");
        // Latest declared total, only the final block's transactions.
        assert_eq!(rows[0].tot_payment, 0);
        assert_eq!(rows[0].cr_total, 200);
        assert_eq!(rows[0].status, Validity::Invalid);
    }

    #[test]
    fn test_structure_and_sequence_reports() {
        let report = audit(
            config(),
            &[
                customer_line("CUST001"),
                header_line("CARD A", "0", "0", "0", "0", "0", "0", "0", "0"),
                detail_line("CARD A", "20251101", "X", "100", "DR"),
                trailer_line(),
                customer_line("CUST002"),
                header_line("CARD B", "0", "0", "0", "0", "0", "0", "0", "0"),
            ],
        );

        let complete = &report.structure_results[0];
        assert_eq!(complete.customer, "CUST001");
        assert_eq!(complete.status, Validity::Valid);
        assert_eq!(complete.missing, "-");

        let partial = &report.structure_results[1];
        assert_eq!(partial.customer, "CUST002");
        assert_eq!(partial.has_03, YesNo::No);
        assert_eq!(partial.status, Validity::Invalid);
        assert_eq!(partial.missing, "03, 04");

        assert_eq!(report.sequence_results[0].status, Validity::Valid);
        assert_eq!(report.sequence_results[0].sequence, "01->02->03->04");
        assert_eq!(report.sequence_results[1].status, Validity::Invalid);
        assert_eq!(report.sequence_results[1].sequence, "01->02");
    }

    #[test]
    fn test_legacy_policy_opens_corporate_blocks_on_customer_records() {
        let legacy = RunConfig::new(CardType::Corporate, date(2025, 10, 16), date(2025, 11, 15))
            .with_header_policy(HeaderPolicy::ByCardType);
        let report = audit(
            legacy,
            &[
                customer_line("CUST001"),
                header_line("CARD A", "1000", "0", "0", "0", "1000", "0", "0", "0"),
                detail_line("CARD A", "20251101", "X", "100", "DR"),
                trailer_line(),
            ],
        );

        // The "01" line opened the block, so the "02" line fell through
        // every branch: one block validated, keyed by the customer line's
        // card columns (blank here), and no "02" in the customer trace.
        assert_eq!(report.validations.len(), 3);
        assert_eq!(report.validations[0].card, "");
        assert_eq!(report.structure_results[0].has_02, YesNo::No);
        assert_eq!(report.sequence_results[0].sequence, "01->03->04");
    }

    #[test]
    fn test_malformed_posting_date_aborts_with_line_number() {
        let result = StatementAuditor::new(config()).process_lines(
            Cursor::new(file_of(&[
                customer_line("CUST001"),
                detail_line("CARD A", "2025ABCD", "X", "100", "DR"),
            ])),
            None,
            &mut NullSink,
        );

        match result {
            Err(AuditError::Format { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected Format error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_cancelled_token_aborts_before_first_record() {
        let token = CancelToken::new();
        token.cancel();
        let result = StatementAuditor::new(config())
            .with_cancel_token(token)
            .process_lines(
                Cursor::new(file_of(&[customer_line("CUST001")])),
                None,
                &mut NullSink,
            );

        assert!(matches!(
            result,
            Err(AuditError::Cancelled { processed: 0 })
        ));
    }

    #[test]
    fn test_same_input_twice_is_identical() {
        let lines = [
            customer_line("CUST001"),
            header_line("CARD A", "1000", "50", "100000", "0", "1050", "50000", "98950", "0"),
            detail_line("CARD A", "20251101", "X", "0", "DR"),
            trailer_line(),
        ];
        let first = audit(config(), &lines);
        let second = audit(config(), &lines);
        assert_eq!(first, second);
    }
}
