//! # slirc-client
//!
//! Connection and dispatch engine for IRC clients.
//!
//! The crate keeps one long-lived line-based connection to an IRC server,
//! parses each line into a structured [`Message`], tracks negotiated
//! capabilities ([`Isupport`]) and session state, and fans incoming
//! messages out to handlers registered on a [`Mux`]. Outbound traffic
//! goes through [`Client`]'s send primitives, including
//! [`split_message`]-based fragmentation of oversized lines, CTCP
//! replies, and SASL authentication.
//!
//! ## Features
//!
//! - Total line parser: prefix, parameters, trailing, CTCP payloads
//! - Typed ISUPPORT (numeric 005) accumulator
//! - Signal-keyed handler mux, plus a regex-filtered variant
//! - Concurrent read/write/keepalive loops with a single idempotent
//!   shutdown path
//! - Response coalescing for request/reply exchanges such as WHOIS
//!
//! ## Quick Start
//!
//! ```no_run
//! use slirc_client::{Client, ClientConfig, Muxer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new(ClientConfig {
//!         nick: "mybot".to_owned(),
//!         user: "mybot".to_owned(),
//!         name: "My Bot".to_owned(),
//!         ..ClientConfig::default()
//!     });
//!
//!     client.mux().handle("irc:connected", slirc_client::handler_fn(
//!         |client, _msg| async move {
//!             client.join("#mychannel", None).await;
//!         },
//!     ));
//!
//!     client.connect("irc.libera.chat:6667").await.expect("dial failed");
//!     let err = client.run().await;
//!     eprintln!("connection terminated: {err}");
//! }
//! ```

#![deny(clippy::all)]

pub mod client;
pub mod coalesce;
pub mod ctcp;
pub mod error;
pub mod isupport;
pub mod line;
pub mod logger;
pub mod message;
pub mod mux;
pub mod regexp;
pub mod response;
pub mod sasl;
pub mod split;
mod transport;

pub use self::client::{
    Authenticator, Client, ClientConfig, CONNECTED_SIGNAL, KEEPALIVE_INTERVAL, SOCKET_DEADLINE,
};
pub use self::coalesce::Coalesce;
pub use self::ctcp::CtcpMessage;
pub use self::error::{ClientError, CtcpError, ProtocolError};
pub use self::isupport::{ChanModes, Isupport};
pub use self::line::LineCodec;
pub use self::logger::{Logger, NullLogger, TracingLogger};
pub use self::message::{Message, Prefix};
pub use self::mux::{handler_fn, Handler, Mux, Muxer};
pub use self::regexp::RegexpMux;
pub use self::sasl::{Mechanism, Plain, Sasl};
pub use self::split::split_message;
