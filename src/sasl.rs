//! SASL authentication as a pluggable [`Authenticator`].
//!
//! The sub-protocol is negotiated over CAP: request the `sasl`
//! capability, announce a mechanism with AUTHENTICATE, relay the server
//! challenge through the mechanism, and close the negotiation with
//! `CAP END` on any of the terminal numerics.
//!
//! # Reference
//! - IRCv3 SASL: <https://ircv3.net/specs/extensions/sasl-3.1>
//! - RFC 4616 (PLAIN): <https://tools.ietf.org/html/rfc4616>

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures_util::future::BoxFuture;

use crate::client::{Authenticator, Client};
use crate::message::Message;
use crate::mux::handler_fn;
use crate::response::{RPL_SASLALREADYAUTH, RPL_SASLERROR, RPL_SASLFAILED, RPL_SASLSUCCESS};

/// A SASL mechanism: a name announced to the server and a generator that
/// turns each server challenge into a response payload.
pub trait Mechanism: Send + Sync {
    /// Mechanism name as announced in `AUTHENTICATE <name>`.
    fn name(&self) -> &str;

    /// Produces the base64 response for a server challenge.
    fn generate(&self, payload: &str) -> String;
}

/// The PLAIN mechanism (RFC 4616): `user NUL user NUL password`,
/// base64-encoded. The challenge is ignored.
pub struct Plain {
    /// Account name.
    pub user: String,
    /// Account password.
    pub password: String,
}

impl Mechanism for Plain {
    fn name(&self) -> &str {
        "PLAIN"
    }

    fn generate(&self, _payload: &str) -> String {
        BASE64.encode(format!("{0}\0{0}\0{1}", self.user, self.password))
    }
}

/// SASL [`Authenticator`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use slirc_client::{Client, ClientConfig, Plain, Sasl};
///
/// let config = ClientConfig {
///     nick: "mynick".to_owned(),
///     user: "mynick".to_owned(),
///     name: "My Bot".to_owned(),
///     authenticator: Some(Arc::new(Sasl::plain("mynick", "hunter2"))),
///     ..ClientConfig::default()
/// };
/// let client = Client::new(config);
/// ```
pub struct Sasl {
    mechanism: Arc<dyn Mechanism>,
}

impl Sasl {
    /// Creates an authenticator around a mechanism.
    pub fn new(mechanism: impl Mechanism + 'static) -> Sasl {
        Sasl {
            mechanism: Arc::new(mechanism),
        }
    }

    /// Shorthand for [`Sasl::new`] with [`Plain`] credentials.
    pub fn plain(user: impl Into<String>, password: impl Into<String>) -> Sasl {
        Sasl::new(Plain {
            user: user.into(),
            password: password.into(),
        })
    }
}

impl Authenticator for Sasl {
    fn authenticate(&self, client: Client) -> BoxFuture<'static, ()> {
        let mechanism = Arc::clone(&self.mechanism);
        Box::pin(async move {
            let mux = client.mux();

            // CAP ACK for sasl moves the handshake forward; anything else
            // aborts it.
            let announce = Arc::clone(&mechanism);
            mux.handle(
                "CAP",
                handler_fn(move |client: Client, msg: Message| {
                    let mechanism = Arc::clone(&announce);
                    async move {
                        let acked = msg.params.get(1).map(String::as_str) == Some("ACK")
                            && msg.params.get(2).map(String::as_str) == Some("sasl");
                        if !acked {
                            client.send("CAP END").await;
                            return;
                        }
                        client
                            .send(format!("AUTHENTICATE {}", mechanism.name()))
                            .await;
                    }
                }),
            );

            let respond = Arc::clone(&mechanism);
            mux.handle(
                "AUTHENTICATE",
                handler_fn(move |client: Client, msg: Message| {
                    let mechanism = Arc::clone(&respond);
                    async move {
                        let payload = msg.params.first().map(String::as_str).unwrap_or("");
                        client
                            .send(format!("AUTHENTICATE {}", mechanism.generate(payload)))
                            .await;
                    }
                }),
            );

            for signal in [RPL_SASLSUCCESS, RPL_SASLFAILED, RPL_SASLERROR, RPL_SASLALREADYAUTH] {
                mux.handle(
                    signal,
                    handler_fn(|client: Client, _msg| async move {
                        client.send("CAP END").await;
                    }),
                );
            }

            client.send("CAP REQ :sasl").await;
            client.login().await;
        })
    }
}
