//! Two timers under bulk control: a steady heartbeat and a flaky probe
//! whose failures land in its error hook.
//!
//! Run with `cargo run --example heartbeat`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tickloop::{HandlerError, TimerGroup, TimerOptions};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut group = TimerGroup::new();

    let beats = Arc::new(AtomicUsize::new(0));
    group.create(
        {
            let beats = Arc::clone(&beats);
            move || {
                let n = beats.fetch_add(1, Ordering::SeqCst) + 1;
                println!("heartbeat {n}");
                Ok(())
            }
        },
        Duration::from_millis(250),
        TimerOptions::repeating(),
    );

    let probes = Arc::new(AtomicUsize::new(0));
    group.create_async(
        {
            let probes = Arc::clone(&probes);
            move || {
                let probes = Arc::clone(&probes);
                async move {
                    let n = probes.fetch_add(1, Ordering::SeqCst) + 1;
                    if n % 3 == 0 {
                        return Err(HandlerError::from(format!("probe {n} timed out")));
                    }
                    println!("probe {n} ok");
                    Ok(())
                }
            }
        },
        Duration::from_millis(400),
        TimerOptions::repeating().with_on_error(|err: Option<&HandlerError>| {
            if let Some(err) = err {
                eprintln!("probe failed: {err}");
            }
        }),
    );

    group.start_all();
    tokio::time::sleep(Duration::from_secs(3)).await;
    group.stop_all();

    println!(
        "done: {} heartbeats, {} probes",
        beats.load(Ordering::SeqCst),
        probes.load(Ordering::SeqCst)
    );
}
