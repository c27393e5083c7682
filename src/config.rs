//! Run parameters for a statement audit.

use crate::record::RecordType;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Card product type, which selects the minimum-payment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardType {
    Regular,
    Corporate,
}

/// Error for unrecognized card-type names.
#[derive(Error, Debug)]
#[error("unknown card type {0:?}, expected REGULAR or CORPORATE")]
pub struct ParseCardTypeError(String);

impl FromStr for CardType {
    type Err = ParseCardTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGULAR" => Ok(CardType::Regular),
            "CORPORATE" => Ok(CardType::Corporate),
            other => Err(ParseCardTypeError(other.to_string())),
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardType::Regular => f.write_str("REGULAR"),
            CardType::Corporate => f.write_str("CORPORATE"),
        }
    }
}

/// Which record type opens a card block.
///
/// Production extracts head every card block with an "02" record regardless
/// of card product. The legacy batch auditor instead opened CORPORATE blocks
/// on the "01" customer record; `ByCardType` reproduces that behavior for
/// comparing runs against legacy output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    CardHeader,
    ByCardType,
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        HeaderPolicy::CardHeader
    }
}

/// Immutable parameters for one audit run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub card_type: CardType,
    /// Inclusive start of the posting-date window.
    pub from_date: NaiveDate,
    /// Inclusive end of the posting-date window.
    pub until_date: NaiveDate,
    pub header_policy: HeaderPolicy,
}

impl RunConfig {
    pub fn new(card_type: CardType, from_date: NaiveDate, until_date: NaiveDate) -> RunConfig {
        RunConfig {
            card_type,
            from_date,
            until_date,
            header_policy: HeaderPolicy::default(),
        }
    }

    pub fn with_header_policy(mut self, header_policy: HeaderPolicy) -> RunConfig {
        self.header_policy = header_policy;
        self
    }

    /// True when a posting date falls inside the configured window. An
    /// inverted window (from > until) matches nothing, so every detail is
    /// reported as filtered.
    pub fn in_window(&self, date: NaiveDate) -> bool {
        self.from_date <= date && date <= self.until_date
    }

    /// The record type that opens a card block under this configuration.
    pub(crate) fn target_header(&self) -> RecordType {
        match self.header_policy {
            HeaderPolicy::CardHeader => RecordType::CardHeader,
            HeaderPolicy::ByCardType => match self.card_type {
                CardType::Regular => RecordType::CardHeader,
                CardType::Corporate => RecordType::CustomerOpen,
            },
        }
    }
}
