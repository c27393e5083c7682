//! # PTSTMT Statement Auditor
//!
//! A streaming validator for fixed-width card-statement extract files. One
//! forward pass reconstructs per-card blocks, recomputes their declared
//! balances, and accumulates the cross-file aggregates (duplicate keys,
//! customer record-type traces, per-card payment totals) that are reduced
//! into reports at end of stream.
//!
//! ## Design Principles
//!
//! - **Single pass**: every report comes out of one sequential scan
//! - **Mismatches are data**: PASS/FAIL and VALID/INVALID are rows, never
//!   errors; only I/O and malformed posting dates abort a run
//! - **Lenient amounts**: blank or malformed numeric fields read as zero,
//!   matching the statement generator's own extracts
//! - **Deterministic output**: rows in file order or first-seen order, so
//!   two runs over the same input produce equal reports
//!
//! ## Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use ptstmt_audit::{CardType, NullSink, RunConfig, StatementAuditor};
//!
//! let config = RunConfig::new(
//!     CardType::Regular,
//!     NaiveDate::from_ymd_opt(2025, 10, 16).unwrap(),
//!     NaiveDate::from_ymd_opt(2025, 11, 15).unwrap(),
//! );
//! let auditor = StatementAuditor::new(config);
//! let report = auditor
//!     .process_path("PTSTMT.TXT".as_ref(), &mut NullSink)
//!     .unwrap();
//! println!("{} balance checks", report.validations.len());
//! ```

pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod money;
pub mod record;
pub mod report;
pub mod sequence;

pub use config::{CardType, HeaderPolicy, RunConfig};
pub use engine::{CancelToken, StatementAuditor};
pub use error::{AuditError, Result};
pub use record::{BlockHeader, DetailRecord, RecordType};
pub use report::{AuditReport, NullSink, ReportBatch, RunSink};
