//! Balance effects of transactions.
//!
//! Every sign rule lives in [`legs`]. Creation applies the legs, deletion
//! applies the negated legs, so a create followed by a delete restores every
//! touched balance exactly.

use tally_shared::types::{AccountId, Money};

use super::types::{Transaction, TransactionDetail};

/// One signed balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    /// Account whose balance changes.
    pub account: AccountId,
    /// Signed change.
    pub delta: Money,
}

/// Whether legs are being applied or undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Transaction is being recorded.
    Apply,
    /// Transaction is being removed.
    Reverse,
}

/// Returns the balance changes for `amount` moving as `detail` describes.
///
/// Legs come back in ascending account order.
#[must_use]
pub fn legs(detail: &TransactionDetail, amount: Money, direction: Direction) -> Vec<Leg> {
    let mut legs = match *detail {
        TransactionDetail::Income { account } => vec![Leg {
            account,
            delta: amount,
        }],
        TransactionDetail::Expense { account } => vec![Leg {
            account,
            delta: -amount,
        }],
        TransactionDetail::Transfer {
            source,
            destination,
        } => vec![
            Leg {
                account: source,
                delta: -amount,
            },
            Leg {
                account: destination,
                delta: amount,
            },
        ],
    };

    if direction == Direction::Reverse {
        for leg in &mut legs {
            leg.delta = -leg.delta;
        }
    }
    legs.sort_by_key(|leg| leg.account);
    legs
}

/// Net effect of a committed transaction on one account.
#[must_use]
pub fn effect_on(transaction: &Transaction, account: AccountId) -> Money {
    legs(&transaction.detail, transaction.amount, Direction::Apply)
        .into_iter()
        .filter(|leg| leg.account == account)
        .map(|leg| leg.delta)
        .sum()
}

/// Balance an account must hold given its opening balance and the log.
#[must_use]
pub fn expected_balance(opening: Money, log: &[Transaction], account: AccountId) -> Money {
    opening
        + log
            .iter()
            .map(|transaction| effect_on(transaction, account))
            .sum::<Money>()
}
