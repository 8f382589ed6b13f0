//! Integration tests for the tick drivers on a real monotonic clock.

use prometheus_work_queue::config::WorkQueueConfig;
use prometheus_work_queue::core::WorkQueue;
use prometheus_work_queue::runtime::TickDriver;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    done()
}

fn counter(hits: &Arc<AtomicUsize>) -> impl Fn() + Send + Sync + 'static {
    let hits = Arc::clone(hits);
    move || {
        hits.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_schedule_wakes_sleeping_driver() {
    // a long idle interval: only the wakeup can make the item fire quickly
    let queue = Arc::new(
        WorkQueue::new(WorkQueueConfig::new().with_idle_wakeup_us(10_000_000)).unwrap(),
    );
    let driver = TickDriver::spawn(Arc::clone(&queue)).unwrap();
    thread::sleep(Duration::from_millis(20));

    let hits = Arc::new(AtomicUsize::new(0));
    queue
        .register_scheduled(Duration::from_millis(5), counter(&hits))
        .unwrap();

    assert!(wait_until(Duration::from_secs(3), || hits.load(Ordering::SeqCst) >= 2));
    driver.stop();
}

#[test]
fn test_items_at_different_rates() {
    let queue = Arc::new(WorkQueue::new(WorkQueueConfig::new().with_idle_wakeup_us(2_000)).unwrap());
    let fast = Arc::new(AtomicUsize::new(0));
    let slow = Arc::new(AtomicUsize::new(0));
    queue
        .register_scheduled(Duration::from_millis(2), counter(&fast))
        .unwrap();
    queue
        .register_scheduled(Duration::from_millis(20), counter(&slow))
        .unwrap();

    let driver = TickDriver::spawn(Arc::clone(&queue)).unwrap();
    assert!(wait_until(Duration::from_secs(5), || slow.load(Ordering::SeqCst) >= 3));
    driver.stop();

    assert!(fast.load(Ordering::SeqCst) > slow.load(Ordering::SeqCst));
}

#[test]
fn test_unschedule_from_other_thread_stops_firing() {
    let queue = Arc::new(WorkQueue::new(WorkQueueConfig::new().with_idle_wakeup_us(2_000)).unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let handle = queue
        .register_scheduled(Duration::from_millis(1), counter(&hits))
        .unwrap();

    let driver = TickDriver::spawn(Arc::clone(&queue)).unwrap();
    assert!(wait_until(Duration::from_secs(3), || hits.load(Ordering::SeqCst) >= 3));

    assert!(queue.unschedule(handle).unwrap());
    // a callback already running unlocked may still complete; two further
    // ticks guarantee it has
    let ticks = driver.ticks();
    assert!(wait_until(Duration::from_secs(3), || driver.ticks() > ticks + 1));
    let frozen = hits.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(hits.load(Ordering::SeqCst), frozen);

    driver.stop();
}

#[test]
fn test_stop_waits_for_in_flight_callback() {
    let queue = Arc::new(WorkQueue::new(WorkQueueConfig::new()).unwrap());
    let entered = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let (e, f) = (Arc::clone(&entered), Arc::clone(&finished));
    queue
        .register_scheduled(Duration::from_micros(100), move || {
            e.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(30));
            f.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    let driver = TickDriver::spawn(Arc::clone(&queue)).unwrap();
    assert!(wait_until(Duration::from_secs(3), || entered.load(Ordering::SeqCst) >= 1));
    driver.stop();

    assert_eq!(entered.load(Ordering::SeqCst), finished.load(Ordering::SeqCst));
}

#[test]
fn test_panicking_callback_does_not_kill_driver() {
    let queue = Arc::new(WorkQueue::new(WorkQueueConfig::new().with_idle_wakeup_us(2_000)).unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    queue
        .register_scheduled(Duration::from_millis(1), || panic!("callback failure"))
        .unwrap();
    queue
        .register_scheduled(Duration::from_millis(1), counter(&hits))
        .unwrap();

    let driver = TickDriver::spawn(Arc::clone(&queue)).unwrap();
    assert!(wait_until(Duration::from_secs(3), || hits.load(Ordering::SeqCst) >= 5));
    assert!(driver.is_running());
    driver.stop();
}

#[cfg(feature = "tokio-runtime")]
mod async_driver {
    use super::*;
    use prometheus_work_queue::runtime::tokio_driver;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_async_driver_wakes_on_schedule() {
        let queue = Arc::new(
            WorkQueue::new(WorkQueueConfig::new().with_idle_wakeup_us(10_000_000)).unwrap(),
        );
        let task = tokio_driver::spawn(Arc::clone(&queue));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let hits = Arc::new(AtomicUsize::new(0));
        queue
            .register_scheduled(Duration::from_millis(5), counter(&hits))
            .unwrap();

        let start = Instant::now();
        while hits.load(Ordering::SeqCst) < 2 && start.elapsed() < Duration::from_secs(3) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(hits.load(Ordering::SeqCst) >= 2);

        queue.request_shutdown();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("driver did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_async_driver_exits_when_shutdown_already_requested() {
        let queue = Arc::new(WorkQueue::new(WorkQueueConfig::new()).unwrap());
        queue.request_shutdown();
        tokio::time::timeout(Duration::from_secs(1), tokio_driver::run(queue))
            .await
            .expect("driver did not exit");
    }
}
