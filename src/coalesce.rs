//! Coalesces multi-message server replies into single batched deliveries.
//!
//! Exchanges like WHOIS answer with several numerics that share a key
//! parameter and finish with a terminal numeric. A [`Coalesce`] registry
//! collects the related messages as they arrive and delivers the batch to
//! every subscriber once a terminal command shows up.
//!
//! Mount the registry on a mux's wildcard signal so it observes every
//! inbound message:
//!
//! ```
//! use std::sync::Arc;
//! use slirc_client::{Client, ClientConfig, Coalesce, Muxer};
//!
//! let client = Client::new(ClientConfig::default());
//! let coalesce = Arc::new(Coalesce::new());
//! client.mux().handle("", coalesce.clone());
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use futures_util::future::BoxFuture;
use tokio::sync::oneshot;

use crate::client::Client;
use crate::message::Message;
use crate::mux::Handler;
use crate::response::{
    ERR_NOSUCHNICK, ERR_NOSUCHSERVER, RPL_ENDOFWHOIS, RPL_WHOISACCOUNT, RPL_WHOISCHANNELS,
    RPL_WHOISIDLE, RPL_WHOISOPERATOR, RPL_WHOISUSER,
};

/// Numerics collected during a WHOIS exchange.
pub const WHOIS_REPLIES: &[&str] = &[
    RPL_WHOISUSER,
    RPL_WHOISOPERATOR,
    RPL_WHOISIDLE,
    RPL_WHOISCHANNELS,
    RPL_WHOISACCOUNT,
];

/// Numerics that terminate a WHOIS exchange.
pub const WHOIS_ENDS: &[&str] = &[RPL_ENDOFWHOIS, ERR_NOSUCHNICK, ERR_NOSUCHSERVER];

struct Interested {
    messages: Vec<Message>,
    ends: Vec<String>,
    subscribers: Vec<oneshot::Sender<Vec<Message>>>,
}

#[derive(Default)]
struct Table {
    next_id: u64,
    // Several (command, param) keys may point at the same record; the id
    // is the identity used when sweeping them all away.
    keys: HashMap<(String, String), u64>,
    records: HashMap<u64, Interested>,
}

/// Subscription registry for request/reply exchanges.
#[derive(Default)]
pub struct Coalesce {
    table: Mutex<Table>,
}

impl Coalesce {
    /// Creates an empty registry.
    pub fn new() -> Coalesce {
        Coalesce::default()
    }

    /// Registers interest in messages whose command is one of `commands`
    /// and whose second parameter equals `param`. The batch is delivered
    /// on `reply` once a command from `ends` arrives.
    ///
    /// Subscriptions to an exchange already in flight share its record.
    /// Returns true iff this call created the record, i.e. the caller
    /// should also issue the triggering request.
    pub fn subscribe(
        &self,
        commands: &[&str],
        ends: &[&str],
        param: &str,
        reply: oneshot::Sender<Vec<Message>>,
    ) -> bool {
        let mut table = self.table.lock().unwrap();

        let existing = commands
            .iter()
            .find_map(|command| table.keys.get(&(command.to_string(), param.to_owned())))
            .copied();
        let ends: Vec<String> = ends.iter().map(|end| end.to_string()).collect();

        match existing {
            Some(id) => {
                let record = table.records.get_mut(&id).expect("dangling coalesce key");
                record.ends = ends;
                record.subscribers.push(reply);
                false
            }
            None => {
                let id = table.next_id;
                table.next_id += 1;
                table.records.insert(
                    id,
                    Interested {
                        messages: Vec::new(),
                        ends,
                        subscribers: vec![reply],
                    },
                );
                for command in commands {
                    table.keys.insert((command.to_string(), param.to_owned()), id);
                }
                true
            }
        }
    }

    /// Feeds one inbound message through the registry. Messages with
    /// fewer than two parameters are ignored; otherwise the lookup key is
    /// `(command, params[1])`.
    pub fn collect(&self, msg: &Message) {
        if msg.params.len() < 2 {
            return;
        }
        let mut table = self.table.lock().unwrap();

        let key = (msg.command.clone(), msg.params[1].clone());
        let Some(&id) = table.keys.get(&key) else {
            return;
        };
        let record = table.records.get_mut(&id).expect("dangling coalesce key");
        record.messages.push(msg.clone());

        if record.ends.iter().any(|end| *end == msg.command) {
            let record = table.records.remove(&id).expect("record vanished");
            for subscriber in record.subscribers {
                let _ = subscriber.send(record.messages.clone());
            }
            table.keys.retain(|_, record_id| *record_id != id);
        }
    }

    /// Runs a WHOIS exchange: subscribes to the WHOIS reply set keyed by
    /// `nick`, issues the request unless one is already in flight, and
    /// resolves with the collected replies once the exchange terminates.
    pub async fn whois(&self, client: &Client, nick: &str) -> Vec<Message> {
        let (tx, rx) = oneshot::channel();
        let mut commands: Vec<&str> = WHOIS_REPLIES.to_vec();
        commands.extend_from_slice(WHOIS_ENDS);
        if self.subscribe(&commands, WHOIS_ENDS, nick, tx) {
            client.send(format!("WHOIS {nick} {nick}")).await;
        }
        rx.await.unwrap_or_default()
    }
}

impl Handler for Coalesce {
    fn process(&self, _client: Client, msg: Message) -> BoxFuture<'static, ()> {
        self.collect(&msg);
        Box::pin(async {})
    }
}
