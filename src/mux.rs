//! Signal-keyed routing of inbound messages to handlers.
//!
//! A [`Mux`] maps a *signal* (the command token, a synthetic
//! `irc:connected`, or a `ctcp:<SUB>` tag) to an ordered list of
//! handlers. Dispatch spawns one task per handler, and every handler
//! receives its own deep copy of the message, so handlers never observe
//! aliased mutation and may run for as long as they like.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use futures_util::future::BoxFuture;

use crate::client::Client;
use crate::message::Message;

/// Processes one inbound message. The handler owns its message copy.
pub trait Handler: Send + Sync {
    /// Runs the handler. Spawned on its own task per dispatched message.
    fn process(&self, client: Client, msg: Message) -> BoxFuture<'static, ()>;
}

struct FnHandler<F>(F);

impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(Client, Message) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn process(&self, client: Client, msg: Message) -> BoxFuture<'static, ()> {
        Box::pin((self.0)(client, msg))
    }
}

/// Adapts an async closure into a [`Handler`].
///
/// # Examples
///
/// ```
/// use slirc_client::{handler_fn, Mux, Muxer};
///
/// let mux = Mux::new();
/// mux.handle("PRIVMSG", handler_fn(|client, msg| async move {
///     client.reply(&msg, "hello yourself").await;
/// }));
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Client, Message) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// A routing table a [`Client`] can dispatch through. Object-safe so
/// clients can swap in variants such as
/// [`RegexpMux`](crate::regexp::RegexpMux).
pub trait Muxer: Send + Sync {
    /// Registers a handler under a signal. The empty signal `""` is a
    /// wildcard that receives every message.
    fn handle(&self, signal: &str, handler: Arc<dyn Handler>);

    /// Returns the handlers a message would be dispatched to: the list
    /// for its signal followed by the wildcard list.
    fn handlers(&self, msg: &Message) -> Vec<Arc<dyn Handler>>;

    /// Fans the message out, spawning one task per handler with a deep
    /// copy each. Must be called from within a tokio runtime.
    fn process(&self, client: &Client, msg: &Message);
}

/// The standard mux: exact signal match plus wildcard.
#[derive(Default)]
pub struct Mux {
    table: RwLock<HashMap<String, Vec<Arc<dyn Handler>>>>,
}

impl Mux {
    /// Creates an empty routing table.
    pub fn new() -> Mux {
        Mux::default()
    }

    /// Registers an async closure under a signal.
    pub fn handle_fn<F, Fut>(&self, signal: &str, f: F)
    where
        F: Fn(Client, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle(signal, handler_fn(f));
    }
}

impl Muxer for Mux {
    fn handle(&self, signal: &str, handler: Arc<dyn Handler>) {
        self.table
            .write()
            .unwrap()
            .entry(signal.to_owned())
            .or_default()
            .push(handler);
    }

    fn handlers(&self, msg: &Message) -> Vec<Arc<dyn Handler>> {
        let table = self.table.read().unwrap();
        let mut out: Vec<Arc<dyn Handler>> =
            table.get(&msg.signal).cloned().unwrap_or_default();
        if let Some(wildcard) = table.get("") {
            out.extend(wildcard.iter().cloned());
        }
        out
    }

    fn process(&self, client: &Client, msg: &Message) {
        for handler in self.handlers(msg) {
            let client = client.clone();
            let copy = msg.clone();
            tokio::spawn(async move { handler.process(client, copy).await });
        }
    }
}
