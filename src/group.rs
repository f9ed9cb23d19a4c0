//! Bulk control over a set of timers
//!
//! A `TimerGroup` is a factory plus a list: timers created through it
//! are retained for the group's lifetime, and `start_all`/`stop_all`
//! forward to every member in creation order. Members stay fully
//! independent otherwise; the handles returned from `create` can be
//! started, stopped, and reconfigured individually.

use std::future::Future;
use std::time::Duration;

use crate::error::TickResult;
use crate::options::TimerOptions;
use crate::timer::Timer;

/// An ordered collection of timers created through it
#[derive(Debug, Default)]
pub struct TimerGroup {
    timers: Vec<Timer>,
}

impl TimerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a timer with a synchronous handler, register it, and hand
    /// back a handle. The timer is not started.
    pub fn create<F>(&mut self, handler: F, delay: Duration, options: TimerOptions) -> Timer
    where
        F: FnMut() -> TickResult + Send + 'static,
    {
        let timer = Timer::new(handler, delay, options);
        self.timers.push(timer.clone());
        timer
    }

    /// Build a timer with an asynchronous handler, register it, and hand
    /// back a handle. The timer is not started.
    pub fn create_async<F, Fut>(
        &mut self,
        handler: F,
        delay: Duration,
        options: TimerOptions,
    ) -> Timer
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickResult> + Send + 'static,
    {
        let timer = Timer::new_async(handler, delay, options);
        self.timers.push(timer.clone());
        timer
    }

    /// Start every member, in creation order
    pub fn start_all(&self) {
        for timer in &self.timers {
            timer.start();
        }
    }

    /// Stop every member, in creation order
    pub fn stop_all(&self) {
        for timer in &self.timers {
            timer.stop();
        }
    }

    /// Number of timers created through this group
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
