//! The single-timer state machine
//!
//! A `Timer` owns one handler and one delay, and schedules its own
//! re-invocation on the Tokio runtime.
//!
//! # Lifecycle
//!
//! 1. `start()` → scheduling decision arms a tick (delayed task + cancel token)
//! 2. Delay elapses → tick commits, handler runs (never cancelled mid-run)
//! 3. Completion reports to the error hook, then re-runs the scheduling
//!    decision: repeating timers re-arm, single-shot timers stop for good
//!
//! Every arm goes through the one decision function, so `start` and tick
//! completion cannot disagree about when the timer keeps running. `stop`
//! and `synchronize` bump an epoch counter; a tick task whose epoch no
//! longer matches has been superseded and backs off at its next check.

use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::TickResult;
use crate::handler::{ErrorHandler, TickHandler};
use crate::options::TimerOptions;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Stopped,
    Started,
}

/// State-machine fields. The guarding mutex is never held across an
/// await; tick tasks re-validate `epoch` after every gap.
struct Core {
    state: TimerState,
    delay: Duration,
    repeat: bool,

    /// Ticks armed so far. Once nonzero, a single-shot timer is spent.
    tick_count: u64,

    /// Cancel handle for the currently waiting tick. `None` while the
    /// handler is running or the timer is idle.
    pending: Option<CancellationToken>,

    /// Bumped by `stop` and `synchronize`. A tick task remembers the
    /// epoch it was armed under and must not fire or re-arm once the
    /// values diverge.
    epoch: u64,
}

struct Shared {
    core: Mutex<Core>,
    handler: Mutex<TickHandler>,
    on_error: Mutex<Option<ErrorHandler>>,
}

/// A single-shot or repeating delay-based callback scheduler.
///
/// Construction never schedules anything; call [`start`](Timer::start)
/// from inside a Tokio runtime to arm the first tick. All mutators are
/// callable while a tick is waiting or its handler is mid-run, and they
/// return `&Self` so calls chain. Cloning hands out another handle to
/// the same timer.
///
/// A timer does not stop itself when dropped. Call
/// [`stop`](Timer::stop) before discarding the last handle, or the
/// armed tick will still fire.
#[derive(Clone)]
pub struct Timer {
    shared: Arc<Shared>,
}

impl Timer {
    /// Create a stopped timer with a synchronous handler.
    pub fn new<F>(handler: F, delay: Duration, options: TimerOptions) -> Self
    where
        F: FnMut() -> TickResult + Send + 'static,
    {
        Self::from_parts(TickHandler::sync(handler), delay, options)
    }

    /// Create a stopped timer with an asynchronous handler. Each tick
    /// calls the closure and awaits the returned future before the next
    /// scheduling decision, so ticks never overlap.
    pub fn new_async<F, Fut>(handler: F, delay: Duration, options: TimerOptions) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickResult> + Send + 'static,
    {
        Self::from_parts(TickHandler::asynchronous(handler), delay, options)
    }

    fn from_parts(handler: TickHandler, delay: Duration, options: TimerOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                core: Mutex::new(Core {
                    state: TimerState::Stopped,
                    delay,
                    repeat: options.repeat,
                    tick_count: 0,
                    pending: None,
                    epoch: 0,
                }),
                handler: Mutex::new(handler),
                on_error: Mutex::new(options.on_error),
            }),
        }
    }

    /// Start the timer. A no-op when already started. A spent
    /// single-shot timer cannot be revived: the scheduling decision
    /// stops it again before anything is armed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> &Self {
        let mut core = self.shared.core.lock();
        if core.state == TimerState::Started {
            return self;
        }
        core.state = TimerState::Started;
        debug!(delay = ?core.delay, repeat = core.repeat, "timer started");
        Shared::schedule_next(&self.shared, &mut core);
        self
    }

    /// Stop the timer, cancelling any waiting tick. Idempotent. A
    /// handler that is already running is not interrupted, but its
    /// completion no longer schedules anything.
    pub fn stop(&self) -> &Self {
        let mut core = self.shared.core.lock();
        if let Some(pending) = core.pending.take() {
            pending.cancel();
        }
        core.epoch += 1;
        core.state = TimerState::Stopped;
        debug!("timer stopped");
        self
    }

    /// Replace the delay. A tick that is already waiting keeps the delay
    /// it was armed with; the new value applies from the next scheduling
    /// decision (or the next [`synchronize`](Timer::synchronize)).
    pub fn set_delay(&self, delay: Duration) -> &Self {
        self.shared.core.lock().delay = delay;
        self
    }

    /// Push back the waiting tick: cancel it and re-arm with the current
    /// delay measured from now, without running the handler. The re-arm
    /// keeps the tick's slot, so a single-shot timer still gets its one
    /// tick. A no-op when the timer is stopped or its handler is
    /// mid-run.
    ///
    /// Must be called from within a Tokio runtime when a tick is
    /// waiting (the re-arm schedules onto it).
    pub fn synchronize(&self) -> &Self {
        let mut core = self.shared.core.lock();
        if let Some(pending) = core.pending.take() {
            pending.cancel();
            core.epoch += 1;
            Shared::arm(&self.shared, &mut core);
        }
        self
    }

    /// Whether the timer is currently stopped
    pub fn is_stopped(&self) -> bool {
        self.shared.core.lock().state == TimerState::Stopped
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core.lock();
        f.debug_struct("Timer")
            .field("state", &core.state)
            .field("delay", &core.delay)
            .field("repeat", &core.repeat)
            .field("tick_count", &core.tick_count)
            .finish_non_exhaustive()
    }
}

impl Shared {
    /// The scheduling decision, the only place a tick gets armed. Runs
    /// with the core lock held, on `start` and after each completed
    /// tick.
    fn schedule_next(shared: &Arc<Shared>, core: &mut Core) {
        if core.state == TimerState::Stopped {
            return;
        }
        if core.tick_count > 0 && !core.repeat {
            // The one tick is used up; this retires the timer.
            core.state = TimerState::Stopped;
            return;
        }
        core.tick_count += 1;
        Self::arm(shared, core);
    }

    /// Arm one tick: spawn the delayed task and keep its cancel token as
    /// the pending handle.
    fn arm(shared: &Arc<Shared>, core: &mut Core) {
        let token = CancellationToken::new();
        core.pending = Some(token.clone());
        trace!(delay = ?core.delay, tick = core.tick_count, "tick armed");
        tokio::spawn(Self::run_tick(
            Arc::clone(shared),
            core.delay,
            core.epoch,
            token,
        ));
    }

    /// One tick from arm to completion. Only the wait is cancellable;
    /// once the tick commits, the handler runs to its end.
    async fn run_tick(shared: Arc<Shared>, delay: Duration, epoch: u64, token: CancellationToken) {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        // Commit point. The wait elapsed, but a stop or synchronize may
        // have superseded this tick before we got scheduled; fire only
        // if it is still the current one.
        {
            let mut core = shared.core.lock();
            if core.state == TimerState::Stopped || core.epoch != epoch {
                return;
            }
            core.pending = None;
        }

        let step = shared.handler.lock().begin();
        let result = step.resolve().await;

        Self::finish_tick(&shared, epoch, result);
    }

    /// Completion: report the outcome, then re-run the scheduling
    /// decision unless this tick was superseded while its handler ran.
    fn finish_tick(shared: &Arc<Shared>, epoch: u64, result: TickResult) {
        // Every committed tick reports, even one whose timer was stopped
        // mid-handler. Hook panics stay contained here; the scheduling
        // decision below must still run.
        if let Some(hook) = shared.on_error.lock().as_mut() {
            let _ = catch_unwind(AssertUnwindSafe(|| hook(result.as_ref().err())));
        }

        let mut core = shared.core.lock();
        if core.epoch != epoch {
            return;
        }
        Self::schedule_next(shared, &mut core);
    }
}
