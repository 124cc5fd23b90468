use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dispatch_engine::ConcurrencyLimiter;

#[tokio::test]
async fn slots_are_released_on_drop() {
    let limiter = ConcurrencyLimiter::new(2);
    let first = limiter.acquire().await.unwrap();
    let second = limiter.acquire().await.unwrap();
    assert_eq!(limiter.running(), 2);
    assert_eq!(limiter.available(), 0);

    drop(first);
    assert_eq!(limiter.running(), 1);
    assert_eq!(limiter.available(), 1);

    drop(second);
    assert_eq!(limiter.running(), 0);
    assert_eq!(limiter.peak(), 2);
}

#[tokio::test]
async fn zero_capacity_is_raised_to_one() {
    let limiter = ConcurrencyLimiter::new(0);
    assert_eq!(limiter.capacity(), 1);
    let _slot = limiter.acquire().await.unwrap();
    assert_eq!(limiter.available(), 0);
}

#[tokio::test]
async fn acquire_blocks_until_a_slot_frees() {
    let limiter = ConcurrencyLimiter::new(1);
    let held = limiter.acquire().await.unwrap();

    let pending = tokio::time::timeout(Duration::from_millis(50), limiter.acquire()).await;
    assert!(pending.is_err(), "second acquire should wait");

    drop(held);
    let next = tokio::time::timeout(Duration::from_millis(500), limiter.acquire()).await;
    assert!(next.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn never_exceeds_capacity_under_contention() {
    let limiter = ConcurrencyLimiter::new(3);
    let inside = Arc::new(AtomicUsize::new(0));
    let worst = Arc::new(AtomicUsize::new(0));

    let mut tasks = Vec::new();
    for _ in 0..40 {
        let limiter = limiter.clone();
        let inside = inside.clone();
        let worst = worst.clone();
        tasks.push(tokio::spawn(async move {
            let _slot = limiter.acquire().await.unwrap();
            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
            worst.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2)).await;
            inside.fetch_sub(1, Ordering::SeqCst);
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert!(worst.load(Ordering::SeqCst) <= 3);
    assert!(limiter.peak() <= 3);
    assert_eq!(limiter.running(), 0);
    assert_eq!(limiter.available(), 3);
}
