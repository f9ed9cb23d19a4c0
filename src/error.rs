//! Error types for tick handlers

use std::any::Any;

use thiserror::Error;

/// Failure value produced by a tick handler.
///
/// Boxed so handlers can fail with any error type. The value reaches the
/// timer's error hook unchanged; downcast to recover the concrete type.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// What a single tick handler invocation resolves to.
pub type TickResult = Result<(), HandlerError>;

/// A tick handler panicked instead of returning an error.
///
/// The panic is caught at the tick boundary and routed to the error hook
/// like any other failure, so one bad tick cannot take the scheduling
/// loop down with it.
#[derive(Debug, Error)]
#[error("tick handler panicked: {message}")]
pub struct HandlerPanic {
    message: String,
}

impl HandlerPanic {
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }

    /// The panic message, when one could be recovered from the payload
    pub fn message(&self) -> &str {
        &self.message
    }
}
