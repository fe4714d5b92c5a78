//! Logging seams for the client engine.
//!
//! The client reports wire traffic and internal events through a
//! [`Logger`]. Implementations must tolerate concurrent invocation; the
//! read and write loops call them from different tasks.

use crate::message::Message;

/// Receives the client's wire traffic and diagnostics.
///
/// Every operation has a no-op default, so implementations override only
/// what they care about. [`NullLogger`] is used when no logger is
/// configured.
pub trait Logger: Send + Sync {
    /// Called with every parsed inbound message.
    fn incoming(&self, _msg: &Message) {}

    /// Called with every outbound line before it is written.
    fn outgoing(&self, _line: &str) {}

    /// Informational events.
    fn info(&self, _text: &str) {}

    /// Verbose diagnostics.
    fn debug(&self, _text: &str) {}

    /// Fatal programming-contract violations. Must not return.
    fn panic(&self, text: &str) -> ! {
        panic!("{text}")
    }
}

/// Logger that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {}

/// Logger that forwards to the `tracing` macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn incoming(&self, msg: &Message) {
        tracing::debug!(raw = %msg.raw, "<-");
    }

    fn outgoing(&self, line: &str) {
        tracing::debug!(raw = %line, "->");
    }

    fn info(&self, text: &str) {
        tracing::info!("{text}");
    }

    fn debug(&self, text: &str) {
        tracing::debug!("{text}");
    }

    fn panic(&self, text: &str) -> ! {
        tracing::error!("{text}");
        panic!("{text}")
    }
}
