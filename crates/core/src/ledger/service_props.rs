//! Property-based tests for LedgerService.
//!
//! - Balance invariant: after any sequence of creates and deletes, each
//!   balance equals its opening balance plus the effects of the live log
//! - Inverse law: create followed by delete restores every balance exactly

use std::sync::Arc;

use chrono::NaiveDate;
use proptest::prelude::*;
use tally_shared::types::{AccountId, Money, UserId};

use super::effect::expected_balance;
use super::error::LedgerError;
use super::service::LedgerService;
use super::testing::MemoryStore;
use super::types::{EntryInput, TransactionDetail, TransactionDraft};

const ACCOUNTS: usize = 3;

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Money> {
    (1i64..1_000_000i64).prop_map(Money::from_minor_units)
}

/// Strategy to generate opening balances, possibly negative.
fn opening_balance() -> impl Strategy<Value = Money> {
    (-1_000_000i64..1_000_000i64).prop_map(Money::from_minor_units)
}

#[derive(Debug, Clone)]
enum Op {
    Income(usize, Money),
    Expense(usize, Money),
    Transfer(usize, usize, Money),
    /// Deletes the live transaction at this index (modulo the log length).
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, positive_amount()).prop_map(|(a, m)| Op::Income(a, m)),
        (0..ACCOUNTS, positive_amount()).prop_map(|(a, m)| Op::Expense(a, m)),
        (0..ACCOUNTS, 0..ACCOUNTS, positive_amount()).prop_map(|(s, d, m)| Op::Transfer(s, d, m)),
        (0..32usize).prop_map(Op::Delete),
    ]
}

fn detail_strategy() -> impl Strategy<Value = (usize, usize, u8)> {
    (0..ACCOUNTS, 0..ACCOUNTS, 0u8..3)
}

fn entry(amount: Money) -> EntryInput {
    EntryInput {
        description: "generated".to_string(),
        amount,
        date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        completed: false,
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn seed(store: &MemoryStore, owner: UserId, openings: &[Money]) -> Vec<AccountId> {
    let mut ids = Vec::with_capacity(openings.len());
    for (i, opening) in openings.iter().enumerate() {
        ids.push(store.seed_account(owner, &format!("acc-{i}"), *opening).await);
    }
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_balances_match_log(
        openings in prop::collection::vec(opening_balance(), ACCOUNTS),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        runtime().block_on(async {
            let store = MemoryStore::new();
            let owner = UserId::new();
            let ids = seed(&store, owner, &openings).await;
            let ledger = LedgerService::new(Arc::new(store.clone()));

            for op in ops {
                let result = match op {
                    Op::Income(a, amount) => ledger
                        .create_income(owner, ids[a], entry(amount))
                        .await
                        .map(|_| ()),
                    Op::Expense(a, amount) => ledger
                        .create_expense(owner, ids[a], entry(amount))
                        .await
                        .map(|_| ()),
                    Op::Transfer(s, d, amount) => {
                        let result = ledger
                            .create_transfer(owner, ids[s], ids[d], entry(amount))
                            .await
                            .map(|_| ());
                        if s == d {
                            assert_eq!(result, Err(LedgerError::SameAccountTransfer(ids[s])));
                            continue;
                        }
                        result
                    }
                    Op::Delete(n) => {
                        let log = store.log().await;
                        if log.is_empty() {
                            continue;
                        }
                        let target = &log[n % log.len()];
                        ledger.delete(owner, target.kind(), target.id).await.map(|_| ())
                    }
                };
                assert_eq!(result, Ok(()));
            }

            let log = store.log().await;
            for (id, opening) in ids.iter().zip(&openings) {
                assert_eq!(store.balance(*id).await, expected_balance(*opening, &log, *id));
            }
        });
    }

    #[test]
    fn prop_create_then_delete_is_identity(
        openings in prop::collection::vec(opening_balance(), ACCOUNTS),
        (first, second, kind) in detail_strategy(),
        amount in positive_amount(),
    ) {
        prop_assume!(kind != 2 || first != second);

        runtime().block_on(async {
            let store = MemoryStore::new();
            let owner = UserId::new();
            let ids = seed(&store, owner, &openings).await;
            let ledger = LedgerService::new(Arc::new(store.clone()));

            let detail = match kind {
                0 => TransactionDetail::Income { account: ids[first] },
                1 => TransactionDetail::Expense { account: ids[first] },
                _ => TransactionDetail::Transfer { source: ids[first], destination: ids[second] },
            };
            let created = ledger
                .create(owner, TransactionDraft::new(entry(amount), detail))
                .await
                .unwrap();
            ledger.delete(owner, created.kind(), created.id).await.unwrap();

            for (id, opening) in ids.iter().zip(&openings) {
                assert_eq!(store.balance(*id).await, *opening);
            }
            assert!(store.log().await.is_empty());
        });
    }

    #[test]
    fn prop_transfer_conserves_total(
        openings in prop::collection::vec(opening_balance(), ACCOUNTS),
        amount in positive_amount(),
    ) {
        runtime().block_on(async {
            let store = MemoryStore::new();
            let owner = UserId::new();
            let ids = seed(&store, owner, &openings).await;
            let ledger = LedgerService::new(Arc::new(store.clone()));

            ledger
                .create_transfer(owner, ids[0], ids[1], entry(amount))
                .await
                .unwrap();

            let mut total = Money::ZERO;
            for id in &ids {
                total += store.balance(*id).await;
            }
            let opening_total: Money = openings.iter().copied().sum();
            assert_eq!(total, opening_total);
            assert_eq!(
                store.balance(ids[0]).await.amount(),
                openings[0].amount() - amount.amount()
            );
        });
    }
}
