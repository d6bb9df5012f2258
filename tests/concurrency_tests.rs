//! Concurrency integration tests
//!
//! Drive the public engine API from many threads with randomly chosen pairs
//! and directions, then check that money was neither created nor destroyed.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ledger_transfer_engine::{
    AccountService, AccountStore, EngineConfig, InMemoryAccountStore, LedgerError, NewAccount,
    TransferEngine, TransferHandle,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

const ACCOUNTS: usize = 8;

fn number(index: usize) -> String {
    format!("ACC-{:03}", index)
}

fn seeded_store(opening: Decimal) -> Arc<InMemoryAccountStore> {
    let store = Arc::new(InMemoryAccountStore::new());
    for i in 0..ACCOUNTS {
        store
            .insert(NewAccount::new(number(i), format!("Owner {}", i), opening))
            .unwrap();
    }
    store
}

fn total(store: &InMemoryAccountStore) -> Decimal {
    store.find_all().iter().map(|a| a.balance).sum()
}

/// Random pair of distinct account numbers and an amount between 0.01 and 20.00
fn random_transfer(rng: &mut StdRng) -> (String, String, Decimal) {
    let from = rng.gen_range(0..ACCOUNTS);
    let mut to = rng.gen_range(0..ACCOUNTS - 1);
    if to >= from {
        to += 1;
    }
    let cents: i64 = rng.gen_range(1..=2000);
    (number(from), number(to), Decimal::new(cents, 2))
}

#[test]
fn test_random_direction_stress_conserves_total() {
    let opening = Decimal::new(10000, 2);
    let store = seeded_store(opening);
    let engine = Arc::new(
        TransferEngine::new(
            Arc::clone(&store),
            EngineConfig::new(8, 3, Duration::ZERO, None),
        )
        .unwrap(),
    );

    let submitters: Vec<_> = (0..4u64)
        .map(|seed| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let handles: Vec<TransferHandle> = (0..500)
                    .map(|_| {
                        let (from, to, amount) = random_transfer(&mut rng);
                        engine.submit(from, to, amount)
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(TransferHandle::wait)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut succeeded = 0;
    for submitter in submitters {
        for outcome in submitter.join().unwrap() {
            match outcome {
                Ok(_) => succeeded += 1,
                Err(LedgerError::InsufficientBalance { .. }) => {}
                Err(other) => panic!("Unexpected failure: {}", other),
            }
        }
    }

    assert!(succeeded > 0);
    assert_eq!(total(&store), opening * Decimal::from(ACCOUNTS as u64));
    for account in store.find_all() {
        assert!(account.balance >= Decimal::ZERO, "{} went negative", account.account_number);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_awaiting_handles_from_async_code() {
    let store = seeded_store(Decimal::new(5000, 2));
    let engine = TransferEngine::new(
        Arc::clone(&store),
        EngineConfig::new(4, 3, Duration::ZERO, None),
    )
    .unwrap();

    // Ring of transfers: every account sends and receives the same amount
    let handles: Vec<TransferHandle> = (0..ACCOUNTS)
        .map(|i| engine.submit(number(i), number((i + 1) % ACCOUNTS), Decimal::new(1000, 2)))
        .collect();

    for outcome in futures::future::join_all(handles).await {
        outcome.unwrap();
    }

    for account in store.find_all() {
        assert_eq!(account.balance, Decimal::new(5000, 2));
        assert_eq!(account.version, 2);
    }
}

#[test]
fn test_service_transfers_from_many_threads_net_to_zero() {
    let store = Arc::new(InMemoryAccountStore::new());
    let service = Arc::new(
        AccountService::new(
            Arc::clone(&store),
            EngineConfig::new(4, 3, Duration::ZERO, None),
        )
        .unwrap(),
    );
    service
        .create_account(NewAccount::new("A", "Alice", Decimal::new(100000, 2)))
        .unwrap();
    service
        .create_account(NewAccount::new("B", "Bob", Decimal::new(100000, 2)))
        .unwrap();

    let workers: Vec<_> = (0..4)
        .map(|t| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for i in 0..250 {
                    let (from, to) = if (t + i) % 2 == 0 { ("A", "B") } else { ("B", "A") };
                    service
                        .transfer(from, to, Decimal::new(100, 2))
                        .wait()
                        .unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(service.get_balance("A").unwrap(), Decimal::new(100000, 2));
    assert_eq!(service.get_balance("B").unwrap(), Decimal::new(100000, 2));
}
