//! Statement record model: record types, block headers, and detail lines.

use crate::layout::{self, span, DateError};
use chrono::NaiveDate;

/// The four structural record types of a statement extract.
///
/// Anything else on the wire (filler, banner, or trailer records) is ignored
/// by the auditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// "01" opens a customer section.
    CustomerOpen,
    /// "02" heads a card block and carries the declared balances.
    CardHeader,
    /// "03" is one posted transaction.
    Detail,
    /// "04" closes a card block.
    BlockClose,
}

impl RecordType {
    /// All types in ascending code order.
    pub const ALL: [RecordType; 4] = [
        RecordType::CustomerOpen,
        RecordType::CardHeader,
        RecordType::Detail,
        RecordType::BlockClose,
    ];

    /// Classifies a raw line by its first two bytes.
    pub fn classify(line: &[u8]) -> Option<RecordType> {
        match layout::slice_field(line, span::RECORD_TYPE) {
            b"01" => Some(RecordType::CustomerOpen),
            b"02" => Some(RecordType::CardHeader),
            b"03" => Some(RecordType::Detail),
            b"04" => Some(RecordType::BlockClose),
            _ => None,
        }
    }

    /// The two-digit wire code.
    pub fn code(self) -> &'static str {
        match self {
            RecordType::CustomerOpen => "01",
            RecordType::CardHeader => "02",
            RecordType::Detail => "03",
            RecordType::BlockClose => "04",
        }
    }

    fn bit(self) -> u8 {
        match self {
            RecordType::CustomerOpen => 1 << 0,
            RecordType::CardHeader => 1 << 1,
            RecordType::Detail => 1 << 2,
            RecordType::BlockClose => 1 << 3,
        }
    }
}

/// Which of the four record types a customer section has shown so far.
///
/// The key space is closed, so a small bitset beats a hash set here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSet(u8);

impl TypeSet {
    pub fn insert(&mut self, record_type: RecordType) {
        self.0 |= record_type.bit();
    }

    pub fn contains(self, record_type: RecordType) -> bool {
        self.0 & record_type.bit() != 0
    }

    /// True when all four record types have been seen.
    pub fn is_complete(self) -> bool {
        self.0 == 0b1111
    }

    /// Codes of the absent types, in ascending code order.
    pub fn missing(self) -> Vec<&'static str> {
        RecordType::ALL
            .iter()
            .filter(|rt| !self.contains(**rt))
            .map(|rt| rt.code())
            .collect()
    }
}

/// Declared balances parsed from a card block header line.
///
/// All amount fields decode leniently (blank or malformed reads as 0), so
/// parsing a header never fails; a nonsense header simply produces FAIL rows
/// downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub card: String,
    pub previous_balance: i64,
    pub interest: i64,
    pub credit_limit: i64,
    pub installment: i64,
    pub new_balance: i64,
    pub min_payment_due: i64,
    pub available_credit: i64,
    /// Declared total payment, consumed by the payment-total report rather
    /// than the block arithmetic.
    pub total_payment: i64,
}

impl BlockHeader {
    pub fn parse(line: &[u8]) -> BlockHeader {
        BlockHeader {
            card: layout::field_str(line, span::CARD),
            previous_balance: layout::field_amount(line, span::PREVIOUS_BALANCE),
            interest: layout::field_amount(line, span::INTEREST),
            credit_limit: layout::field_amount(line, span::CREDIT_LIMIT),
            installment: layout::field_amount(line, span::INSTALLMENT),
            new_balance: layout::field_amount(line, span::NEW_BALANCE),
            min_payment_due: layout::field_amount(line, span::MIN_DUE),
            available_credit: layout::field_amount(line, span::AVAILABLE_CREDIT),
            total_payment: layout::field_amount(line, span::TOTAL_PAYMENT),
        }
    }
}

/// One posted transaction from a "03" detail line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub posting_date: NaiveDate,
    /// The detail line's own card field, which need not match the card of
    /// the block it sits in.
    pub card: String,
    pub detail: String,
    pub amount: i64,
    /// Raw trimmed direction code. "DR"/"CR" in well-formed extracts, but
    /// unknown codes are kept verbatim so duplicate keys stay faithful.
    pub direction: String,
}

impl DetailRecord {
    /// Parses a detail line. The posting date is the one strict field; its
    /// error carries the raw text for diagnostics.
    pub fn parse(line: &[u8]) -> Result<DetailRecord, DateError> {
        // The date field is deliberately not trimmed: a short or shifted
        // field must fail the parse, not limp through.
        let raw_date = layout::decode_latin1(layout::slice_field(line, span::POSTING_DATE));
        let posting_date = layout::parse_yyyymmdd(&raw_date)?;

        Ok(DetailRecord {
            posting_date,
            card: layout::field_str(line, span::CARD),
            detail: layout::field_str(line, span::TRX_DETAIL),
            amount: layout::field_amount(line, span::TRX_AMOUNT),
            direction: layout::field_str(line, span::TRX_DIRECTION),
        })
    }
}
