//! Concurrency tests for the collection store
//!
//! These tests verify the locking contract under parallel load:
//! - Concurrent creates on one collection get ids 1..=N with no gaps
//! - Racing first-writers to a new collection share one counter
//! - A held lock on one collection does not block another
//! - Readers never see a half-applied transaction
//! - Async tasks on a multi-threaded runtime behave the same as threads

use std::collections::HashSet;
use std::sync::mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use collstore_core::{Error, Fields, RecordId, Value};
use collstore_storage::CollectionStore;

#[test]
fn test_hundred_concurrent_creates_yield_dense_ids() {
    let store = Arc::new(CollectionStore::new());
    let barrier = Arc::new(Barrier::new(100));

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store
                    .create("items", Fields::new().with("n", i))
                    .unwrap()
                    .id()
            })
        })
        .collect();

    let ids: HashSet<RecordId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids, (1..=100).collect::<HashSet<_>>());
    assert_eq!(store.count("items").unwrap(), 100);
}

#[test]
fn test_racing_vivification_shares_one_collection() {
    // Each round races writers on a brand-new name
    for round in 0..20 {
        let store = Arc::new(CollectionStore::new());
        let barrier = Arc::new(Barrier::new(8));
        let name = format!("fresh_{round}");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                let name = name.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.create(&name, Fields::new()).unwrap().id()
                })
            })
            .collect();

        let ids: HashSet<RecordId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(ids.len(), 8, "duplicate ids in round {round}");
        assert_eq!(store.collections(), vec![name]);
    }
}

#[test]
fn test_ids_monotonic_per_thread() {
    let store = Arc::new(CollectionStore::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let ids: Vec<RecordId> = (0..250)
                    .map(|_| store.create("seq", Fields::new()).unwrap().id())
                    .collect();
                ids
            })
        })
        .collect();

    for handle in handles {
        let ids = handle.join().unwrap();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
    assert_eq!(store.count("seq").unwrap(), 1000);
}

#[test]
fn test_held_lock_does_not_block_other_collection() {
    let store = Arc::new(CollectionStore::new());
    let (locked_tx, locked_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let holder = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store
                .transaction("users", |txn| {
                    txn.create(Fields::new().with("name", "slow"))?;
                    locked_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Ok::<_, Error>(())
                })
                .unwrap();
        })
    };

    locked_rx.recv().unwrap();

    // "users" is locked; "orders" must still make progress
    let (done_tx, done_rx) = mpsc::channel();
    let other = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            let rec = store.create("orders", Fields::new().with("total", 3)).unwrap();
            done_tx.send(rec.id()).unwrap();
        })
    };
    assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)), Ok(1));

    release_tx.send(()).unwrap();
    holder.join().unwrap();
    other.join().unwrap();
    assert_eq!(store.count("users").unwrap(), 1);
}

#[test]
fn test_same_collection_writer_waits_for_lock() {
    let store = Arc::new(CollectionStore::new());
    let (locked_tx, locked_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();

    let holder = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store
                .transaction("users", |_txn| {
                    locked_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    Ok::<_, Error>(())
                })
                .unwrap();
        })
    };
    locked_rx.recv().unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            store.create("users", Fields::new()).unwrap();
            done_tx.send(()).unwrap();
        })
    };

    assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());
    release_tx.send(()).unwrap();
    assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());

    holder.join().unwrap();
    writer.join().unwrap();
}

#[test]
fn test_readers_never_see_partial_transaction() {
    let store = Arc::new(CollectionStore::new());
    store
        .create("pair", Fields::new().with("left", 0).with("right", 0))
        .unwrap();

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 1..=500i64 {
                store
                    .transaction("pair", |txn| {
                        txn.update(1, Fields::new().with("left", i))?;
                        txn.update(1, Fields::new().with("right", i))?;
                        Ok::<_, Error>(())
                    })
                    .unwrap();
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..2_000 {
                let rec = store.read("pair", 1).unwrap().unwrap();
                assert_eq!(rec.get("left"), rec.get("right"));
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
    let rec = store.read("pair", 1).unwrap().unwrap();
    assert_eq!(rec.get("left"), Some(Value::Int(500)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_async_tasks() {
    let store = Arc::new(CollectionStore::new());

    let tasks: Vec<_> = (0..100)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let collection = if i % 2 == 0 { "users" } else { "orders" };
                store.create(collection, Fields::new().with("i", i)).unwrap().id()
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.unwrap());
    }

    assert_eq!(ids.len(), 100);
    assert_eq!(store.count("users").unwrap(), 50);
    assert_eq!(store.count("orders").unwrap(), 50);
    let user_ids: HashSet<_> = store
        .read_all("users")
        .unwrap()
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(user_ids, (1..=50).collect::<HashSet<_>>());
}
