//! End-to-end tests for the fixed-mode pool: submission, result delivery,
//! ordering, concurrent submitters, and failure containment.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use taskpool::util::init_tracing;
use taskpool::{PoolError, PoolMode, ThreadPool};

/// Two workers, five sleeping tasks: results arrive complete and the
/// elapsed time shows at least three execution rounds.
#[test]
fn test_fixed_pool_small_job() {
    init_tracing();

    let pool = ThreadPool::new();
    pool.set_mode(PoolMode::Fixed);
    pool.start(2).expect("start pool");

    let started = Instant::now();
    let handles: Vec<_> = (0..5_usize)
        .map(|i| {
            pool.submit(move || {
                thread::sleep(Duration::from_millis(100));
                i
            })
            .expect("submit task")
        })
        .collect();

    let results: BTreeSet<usize> =
        handles.into_iter().map(|h| h.get_as::<usize>().expect("task result")).collect();
    let elapsed = started.elapsed();

    assert_eq!(results, (0..5).collect::<BTreeSet<_>>());
    // 5 tasks of 100ms on 2 workers need at least 3 rounds.
    assert!(elapsed >= Duration::from_millis(250), "finished too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "finished too slowly: {elapsed:?}");
}

/// A single worker preserves FIFO order among accepted tasks.
#[test]
fn test_single_worker_runs_tasks_in_fifo_order() {
    init_tracing();

    let pool = ThreadPool::new();
    pool.start(1).expect("start pool");

    let order = Arc::new(Mutex::new(Vec::new()));
    let handles: Vec<_> = (0..10_usize)
        .map(|i| {
            let order = Arc::clone(&order);
            pool.submit(move || order.lock().unwrap().push(i)).expect("submit task")
        })
        .collect();

    for handle in handles {
        handle.get_as::<()>().expect("task result");
    }
    assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
}

/// Eight submitter threads race 1000 increments each through the pool; the
/// shared counter lands exactly on 8000 and every handle is valid.
#[test]
fn test_concurrent_submitters() {
    init_tracing();

    let pool = Arc::new(ThreadPool::new());
    pool.set_queue_capacity(16_384);
    pool.start(4).expect("start pool");

    let counter = Arc::new(AtomicU64::new(0));
    let (handle_tx, handle_rx) = crossbeam_channel::unbounded();

    let submitters: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let counter = Arc::clone(&counter);
            let handle_tx = handle_tx.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let counter = Arc::clone(&counter);
                    let handle = pool
                        .submit(move || {
                            counter.fetch_add(1, Ordering::Relaxed);
                        })
                        .expect("submit task");
                    handle_tx.send(handle).expect("collect handle");
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.join().expect("submitter thread");
    }
    drop(handle_tx);

    let mut delivered = 0;
    for handle in handle_rx {
        assert!(handle.is_valid());
        handle.get_as::<()>().expect("task result");
        delivered += 1;
    }
    assert_eq!(delivered, 8_000);
    assert_eq!(counter.load(Ordering::Relaxed), 8_000);

    let stats = pool.stats();
    assert_eq!(stats.submitted_tasks, 8_000);
    assert_eq!(stats.completed_tasks, 8_000);
    assert_eq!(stats.rejected_tasks, 0);
}

/// Extracting a result as the wrong type fails with `TypeMismatch` and the
/// pool keeps working.
#[test]
fn test_type_mismatch_extraction() {
    init_tracing();

    let pool = ThreadPool::new();
    pool.start(2).expect("start pool");

    let handle = pool.submit(|| 42_i64).expect("submit task");
    match handle.get_as::<String>() {
        Err(PoolError::TypeMismatch { requested }) => assert!(requested.contains("String")),
        other => panic!("expected TypeMismatch, got {other:?}"),
    }

    let handle = pool.submit(|| 42_i64).expect("submit task");
    assert_eq!(handle.get_as::<i64>().expect("task result"), 42);
}

/// A panicking task publishes the empty sentinel and the worker survives to
/// run later tasks.
#[test]
fn test_panicking_task_does_not_kill_worker() {
    init_tracing();

    let pool = ThreadPool::new();
    pool.start(1).expect("start pool");

    let failing = pool.submit(|| -> u32 { panic!("task failure") }).expect("submit task");
    let value = failing.get();
    assert!(value.is_empty());

    // The sole worker must still be alive to run this.
    let following = pool.submit(|| 7_u32).expect("submit task");
    assert_eq!(following.get_as::<u32>().expect("task result"), 7);

    let stats = pool.stats();
    assert_eq!(stats.panicked_tasks, 1);
    assert_eq!(stats.completed_tasks, 1);
    assert_eq!(stats.current_workers, 1);
}

/// Submitting before start fails with `NotRunning`.
#[test]
fn test_submit_requires_start() {
    init_tracing();

    let pool = ThreadPool::new();
    assert!(matches!(pool.submit(|| ()), Err(PoolError::NotRunning)));
}

/// `start_default` sizes the pool to the hardware thread count.
#[test]
fn test_start_default_uses_hardware_threads() {
    init_tracing();

    let pool = ThreadPool::new();
    pool.start_default().expect("start pool");
    assert_eq!(pool.stats().current_workers, num_cpus::get());

    let handle = pool.submit(|| 1_u8 + 1).expect("submit task");
    assert_eq!(handle.get_as::<u8>().expect("task result"), 2);
}

/// Results remain retrievable from handles after the pool is gone.
#[test]
fn test_handles_outlive_the_pool() {
    init_tracing();

    let pool = ThreadPool::new();
    pool.start(2).expect("start pool");
    let handles: Vec<_> =
        (0..4_u32).map(|i| pool.submit(move || i + 1).expect("submit task")).collect();
    drop(pool);

    let sum: u32 = handles.into_iter().map(|h| h.get_as::<u32>().expect("task result")).sum();
    assert_eq!(sum, 1 + 2 + 3 + 4);
}
