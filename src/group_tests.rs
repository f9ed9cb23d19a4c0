//! Tests for bulk timer control

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::sleep;

use crate::{TickResult, TimerGroup, TimerOptions};

const DELAY: Duration = Duration::from_millis(100);
const EPSILON: Duration = Duration::from_millis(1);

/// Counter plus a handler that bumps it and succeeds
fn counting_handler() -> (Arc<AtomicUsize>, impl FnMut() -> TickResult + Send + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    (count, move || {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
}

#[test]
fn test_group_starts_empty() {
    let group = TimerGroup::new();
    assert!(group.is_empty());
    assert_eq!(group.len(), 0);
}

#[test]
fn test_create_registers_without_starting() {
    let mut group = TimerGroup::new();
    let (_count, handler) = counting_handler();

    let timer = group.create(handler, DELAY, TimerOptions::default());

    assert_eq!(group.len(), 1);
    assert!(!group.is_empty());
    assert!(timer.is_stopped(), "creation must not start the timer");
}

#[tokio::test(start_paused = true)]
async fn test_start_all_and_stop_all_cover_every_member() {
    let mut group = TimerGroup::new();
    let mut counts = Vec::new();
    for _ in 0..3 {
        let (count, handler) = counting_handler();
        group.create(handler, DELAY, TimerOptions::repeating());
        counts.push(count);
    }

    group.start_all();
    sleep(DELAY + EPSILON).await;
    for count in &counts {
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    group.stop_all();
    sleep(DELAY * 3).await;
    for count in &counts {
        assert_eq!(count.load(Ordering::SeqCst), 1, "stopped members stay quiet");
    }
}

#[tokio::test(start_paused = true)]
async fn test_start_all_twice_arms_each_member_once() {
    let mut group = TimerGroup::new();
    let mut counts = Vec::new();
    for _ in 0..3 {
        let (count, handler) = counting_handler();
        group.create(handler, DELAY, TimerOptions::repeating());
        counts.push(count);
    }

    group.start_all();
    group.start_all();
    sleep(DELAY + EPSILON).await;
    for count in &counts {
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    group.stop_all();
}

#[tokio::test(start_paused = true)]
async fn test_members_run_on_their_own_delays() {
    let mut group = TimerGroup::new();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let fast = {
        let order = Arc::clone(&order);
        move || {
            order.lock().push("fast");
            Ok(())
        }
    };
    let slow = {
        let order = Arc::clone(&order);
        move || {
            let order = Arc::clone(&order);
            async move {
                order.lock().push("slow");
                Ok(())
            }
        }
    };
    group.create(fast, DELAY, TimerOptions::default());
    group.create_async(slow, DELAY * 2, TimerOptions::default());

    group.start_all();
    sleep(DELAY * 2 + EPSILON).await;

    assert_eq!(*order.lock(), vec!["fast", "slow"]);
}

#[tokio::test(start_paused = true)]
async fn test_member_handles_stay_independent() {
    let mut group = TimerGroup::new();
    let (count_a, handler_a) = counting_handler();
    let (count_b, handler_b) = counting_handler();

    let a = group.create(handler_a, DELAY, TimerOptions::repeating());
    let b = group.create(handler_b, DELAY, TimerOptions::repeating());

    group.start_all();
    a.stop();

    sleep(DELAY + EPSILON).await;
    assert_eq!(count_a.load(Ordering::SeqCst), 0, "stopped member must not tick");
    assert_eq!(count_b.load(Ordering::SeqCst), 1);

    group.stop_all();
    assert!(a.is_stopped());
    assert!(b.is_stopped());
}
