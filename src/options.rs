//! Construction-time timer configuration

use std::fmt;

use crate::error::HandlerError;
use crate::handler::ErrorHandler;

/// Options a [`Timer`](crate::Timer) is built with.
///
/// Everything here is fixed for the timer's lifetime; only the delay
/// (passed separately) can change afterwards. The default is a
/// single-shot timer that discards handler failures.
pub struct TimerOptions {
    /// Re-arm after each completed tick until stopped. A single-shot
    /// timer (`false`) stops for good once its one tick has run.
    pub repeat: bool,

    /// Completion hook, called after every finished tick with
    /// `Some(&err)` on failure and `None` on success. Without one,
    /// failures are silently dropped.
    pub on_error: Option<ErrorHandler>,
}

impl TimerOptions {
    /// Options for a repeating timer
    pub fn repeating() -> Self {
        Self {
            repeat: true,
            on_error: None,
        }
    }

    /// Attach a completion hook
    pub fn with_on_error<F>(mut self, hook: F) -> Self
    where
        F: FnMut(Option<&HandlerError>) + Send + 'static,
    {
        self.on_error = Some(Box::new(hook));
        self
    }
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            repeat: false,
            on_error: None,
        }
    }
}

impl fmt::Debug for TimerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerOptions")
            .field("repeat", &self.repeat)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
