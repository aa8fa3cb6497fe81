// Integration tests for the completion counter and worker statistics

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use quadra::pool::counter::{CompletionCounter, WaitOutcome, WorkerStats};

#[test]
fn test_counter_counts_every_increment() {
    let counter = Arc::new(CompletionCounter::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for _ in 0..1000 {
                    counter.increment();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(counter.get(), 8000);
}

#[test]
fn test_wait_for_returns_once_target_reached() {
    let counter = Arc::new(CompletionCounter::new());
    let incrementer = {
        let counter = Arc::clone(&counter);
        thread::spawn(move || {
            for _ in 0..5 {
                thread::sleep(Duration::from_millis(5));
                counter.increment();
            }
        })
    };

    assert_eq!(counter.wait_for(5), WaitOutcome::Reached);
    assert!(counter.get() >= 5);
    incrementer.join().unwrap();
}

#[test]
fn test_wait_for_reached_target_does_not_block() {
    let counter = CompletionCounter::new();
    assert_eq!(counter.wait_for(0), WaitOutcome::Reached);
    counter.increment();
    assert_eq!(counter.wait_for(1), WaitOutcome::Reached);
}

#[test]
fn test_cancel_releases_waiter() {
    let counter = Arc::new(CompletionCounter::new());
    let waiter = {
        let counter = Arc::clone(&counter);
        thread::spawn(move || counter.wait_for(10))
    };

    thread::sleep(Duration::from_millis(50));
    counter.cancel();
    assert_eq!(waiter.join().unwrap(), WaitOutcome::Cancelled);
    assert!(counter.is_cancelled());
}

#[test]
fn test_wait_for_timeout_expires() {
    let counter = CompletionCounter::new();
    counter.increment();
    assert_eq!(
        counter.wait_for_timeout(2, Duration::from_millis(30)),
        WaitOutcome::TimedOut
    );
    assert_eq!(
        counter.wait_for_timeout(1, Duration::from_millis(30)),
        WaitOutcome::Reached
    );
}

#[test]
fn test_worker_stats_average() {
    let stats = WorkerStats::new();
    assert_eq!(stats.average(), Duration::ZERO);

    stats.record(Duration::from_millis(2));
    stats.record(Duration::from_millis(4));
    assert_eq!(stats.processed(), 2);
    assert_eq!(stats.busy(), Duration::from_millis(6));
    assert_eq!(stats.average(), Duration::from_millis(3));
}
