//! Card block reconstruction and arithmetic validation.
//!
//! A block is one header record plus the detail records that follow it, up
//! to the next header or end of file. The validator recomputes the three
//! derived header fields from the block's contents and reports each as a
//! PASS or FAIL row.

use crate::config::CardType;
use crate::money::round_half_up;
use crate::record::BlockHeader;
use crate::report::{BalanceCheck, CheckField, CheckStatus};
use rust_decimal::Decimal;

/// REGULAR cards never owe less than this per statement, in minor units.
const MIN_PAYMENT_FLOOR: i64 = 50_000;

/// Running debit/credit totals for one open block.
///
/// Reset when a block opens; only grows while the block is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxnStats {
    pub debit: i64,
    pub credit: i64,
}

impl TxnStats {
    /// Adds an amount under its direction code. Codes other than "DR"/"CR"
    /// carry no arithmetic weight; they still feed duplicate keys and
    /// payment aggregates upstream.
    pub fn add(&mut self, direction: &str, amount: i64) {
        match direction {
            "DR" => self.debit += amount,
            "CR" => self.credit += amount,
            _ => {}
        }
    }
}

/// A card block mid-reconstruction: the header that opened it plus the
/// running totals accumulated so far.
///
/// Each block is validated exactly once, when the next header closes it or
/// at end of file, and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct OpenBlock {
    pub header: BlockHeader,
    pub stats: TxnStats,
}

impl OpenBlock {
    pub fn new(header: BlockHeader) -> OpenBlock {
        OpenBlock {
            header,
            stats: TxnStats::default(),
        }
    }

    /// Recomputes the new balance, available credit, and minimum payment
    /// from the block's contents and compares each to the declared header
    /// value.
    ///
    /// Always returns exactly three rows, in field order. Mismatches are
    /// FAIL rows, never errors.
    pub fn validate(&self, card_type: CardType) -> [BalanceCheck; 3] {
        let header = &self.header;

        let expected_new = round_half_up(Decimal::from(
            self.stats.debit + header.previous_balance + header.interest - self.stats.credit,
        ));
        let expected_avl = round_half_up(Decimal::from(
            header.credit_limit - expected_new - header.installment,
        ));

        let mut expected_min = match card_type {
            CardType::Corporate => expected_new,
            CardType::Regular => {
                // 5% of the new balance, never below the floor.
                round_half_up(Decimal::from(expected_new) * Decimal::new(5, 2))
                    .max(MIN_PAYMENT_FLOOR)
            }
        };
        // Nothing is due on a zero or credit balance, floor included.
        if expected_new <= 0 {
            expected_min = 0;
        }

        let check = |field, expected, actual| BalanceCheck {
            card: header.card.clone(),
            field,
            expected,
            actual,
            status: if expected == actual {
                CheckStatus::Pass
            } else {
                CheckStatus::Fail
            },
        };

        [
            check(CheckField::NewBalance, expected_new, header.new_balance),
            check(
                CheckField::AvailableCredit,
                expected_avl,
                header.available_credit,
            ),
            check(CheckField::MinPayment, expected_min, header.min_payment_due),
        ]
    }
}
