//! Folder pool concurrency tests

use std::sync::{Arc, Barrier};
use std::thread;

use hostsync::models::FolderPoolEntry;
use hostsync::services::FolderPool;
use hostsync::utils::AppError;

use crate::common::PoolFactory;

#[test]
fn test_concurrent_acquire_of_last_seat() {
    for _ in 0..50 {
        let pool = Arc::new(FolderPool::from_entries(vec![FolderPoolEntry::new("/pool/a", 1)]));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    pool.acquire(None)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let granted = results.iter().filter(|r| r.is_ok()).count();
        let exhausted = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::ResourceExhausted(_))))
            .count();
        assert_eq!(granted, 1);
        assert_eq!(exhausted, 1);
        assert_eq!(pool.snapshot()[0].taken_seats, 1);
    }
}

#[test]
fn test_release_then_acquire() {
    let pool = FolderPool::from_entries(vec![FolderPoolEntry::new("/pool/a", 1)]);

    assert_eq!(pool.acquire(None).unwrap(), "/pool/a");
    assert!(pool.acquire(None).is_err());

    assert!(pool.release("/pool/a"));
    assert_eq!(pool.acquire(None).unwrap(), "/pool/a");

    // Seat counters never leave [0, total]
    assert!(pool.release("/pool/a"));
    assert!(pool.release("/pool/a"));
    assert_eq!(pool.snapshot()[0].taken_seats, 0);
}

#[test]
fn test_many_threads_never_overbook() {
    let factory = PoolFactory::new();
    let entries = vec![factory.create(3), factory.create(2)];
    let pool = Arc::new(FolderPool::from_entries(entries));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.acquire(None).is_ok())
        })
        .collect();
    let granted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(granted, 5);
    for entry in pool.snapshot() {
        assert_eq!(entry.taken_seats, entry.total_seats);
    }
}
