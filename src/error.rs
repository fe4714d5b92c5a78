//! Error types for the client engine.
//!
//! Transport and framing failures are [`ProtocolError`]s; the terminal
//! errors surfaced from [`Client::run`](crate::Client::run) and the dial
//! methods are [`ClientError`]s.

use thiserror::Error;

/// Convenience type alias for Results using [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Errors produced by the line codec and the transport layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the maximum allowed length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Observed line length in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Inbound line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
        /// Description of the decode failure.
        details: String,
    },

    /// Outbound line contained a character the wire format forbids.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),
}

/// Terminal errors observed by a [`Client`](crate::Client).
///
/// The first such error recorded wins; it is what
/// [`Client::run`](crate::Client::run) returns.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Codec or socket failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The server closed the connection.
    #[error("connection closed by server")]
    ConnectionClosed,

    /// No line was read or written within the socket deadline.
    #[error("socket deadline elapsed")]
    Timeout,

    /// `run` was called before a successful dial.
    #[error("client is not connected")]
    NotConnected,

    /// A TLS dial was requested without a TLS configuration.
    #[error("no TLS configuration supplied")]
    TlsConfigMissing,

    /// The client already terminated; dialing it again is refused.
    #[error("client is dead")]
    DeadClient,
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Protocol(ProtocolError::Io(err))
    }
}

/// Error returned by [`Message::ctcp`](crate::Message::ctcp) when the
/// message does not carry a CTCP payload.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("not a CTCP message")]
pub struct CtcpError;
