pub mod error;
pub mod group;
pub mod handler;
pub mod options;
pub mod timer;

#[cfg(test)]
mod group_tests;

// Re-exports for convenience
pub use error::{HandlerError, HandlerPanic, TickResult};
pub use group::TimerGroup;
pub use handler::ErrorHandler;
pub use options::TimerOptions;
pub use timer::Timer;
