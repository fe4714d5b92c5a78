//! Regex-filtered mux variant.
//!
//! Handlers register under `"SIGNAL/regex"` patterns; a registration
//! without a `/regex` part is unconditional. The expression is matched
//! against the message's last parameter, and a matching handler can
//! recover its capture groups through [`RegexpMux::vars`] while it runs.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

use regex::Regex;

use crate::client::Client;
use crate::message::Message;
use crate::mux::{handler_fn, Handler, Muxer};

struct Pattern {
    regex: Option<Regex>,
    handler: Arc<dyn Handler>,
}

/// Mux that filters dispatch through regular expressions.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use slirc_client::RegexpMux;
///
/// let mux = Arc::new(RegexpMux::new());
/// let vars_mux = Arc::clone(&mux);
/// mux.handle_fn("PRIVMSG/^!echo (.+)$", move |client, msg| {
///     let mux = Arc::clone(&vars_mux);
///     async move {
///         if let Some(vars) = mux.vars(&msg) {
///             client.reply(&msg, &vars[1]).await;
///         }
///     }
/// });
/// ```
#[derive(Default)]
pub struct RegexpMux {
    table: RwLock<HashMap<String, Vec<Pattern>>>,
    // Capture groups live here for the duration of the matched handler,
    // keyed by the buffer identity of the handler's message copy.
    vars: Arc<Mutex<HashMap<usize, Vec<String>>>>,
}

fn vars_key(msg: &Message) -> usize {
    msg.raw.as_ptr() as usize
}

impl RegexpMux {
    /// Creates an empty routing table.
    pub fn new() -> RegexpMux {
        RegexpMux::default()
    }

    /// Registers an async closure under a `"SIGNAL/regex"` pattern.
    ///
    /// # Panics
    ///
    /// Panics if the regex part of the pattern does not compile.
    pub fn handle_fn<F, Fut>(&self, pattern: &str, f: F)
    where
        F: Fn(Client, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle(pattern, handler_fn(f));
    }

    /// Returns the capture groups recorded for a running handler's
    /// message copy. Group 0 is the whole match. `None` for handlers that
    /// registered without a regex, or once the handler has returned.
    pub fn vars(&self, msg: &Message) -> Option<Vec<String>> {
        self.vars.lock().unwrap().get(&vars_key(msg)).cloned()
    }
}

impl Muxer for RegexpMux {
    fn handle(&self, pattern: &str, handler: Arc<dyn Handler>) {
        let (signal, regex) = match pattern.split_once('/') {
            Some((signal, regex)) => (
                signal,
                Some(Regex::new(regex).expect("invalid handler pattern")),
            ),
            None => (pattern, None),
        };
        self.table
            .write()
            .unwrap()
            .entry(signal.to_owned())
            .or_default()
            .push(Pattern { regex, handler });
    }

    fn handlers(&self, msg: &Message) -> Vec<Arc<dyn Handler>> {
        let table = self.table.read().unwrap();
        let mut out = Vec::new();
        let candidates = table
            .get(&msg.signal)
            .into_iter()
            .chain(table.get(""))
            .flatten();
        for pattern in candidates {
            match &pattern.regex {
                None => out.push(Arc::clone(&pattern.handler)),
                Some(regex) => {
                    if let Some(last) = msg.params.last() {
                        if regex.is_match(last) {
                            out.push(Arc::clone(&pattern.handler));
                        }
                    }
                }
            }
        }
        out
    }

    fn process(&self, client: &Client, msg: &Message) {
        let table = self.table.read().unwrap();
        let candidates = table
            .get(&msg.signal)
            .into_iter()
            .chain(table.get(""))
            .flatten();

        for pattern in candidates {
            let handler = Arc::clone(&pattern.handler);
            let client = client.clone();
            let regex = match &pattern.regex {
                None => {
                    let copy = msg.clone();
                    tokio::spawn(async move { handler.process(client, copy).await });
                    continue;
                }
                Some(regex) => regex,
            };

            let Some(last) = msg.params.last() else {
                continue;
            };
            let Some(captures) = regex.captures(last) else {
                continue;
            };
            let groups: Vec<String> = captures
                .iter()
                .map(|group| group.map_or(String::new(), |m| m.as_str().to_owned()))
                .collect();

            let copy = msg.clone();
            let key = vars_key(&copy);
            self.vars.lock().unwrap().insert(key, groups);

            let vars = Arc::clone(&self.vars);
            tokio::spawn(async move {
                handler.process(client, copy).await;
                vars.lock().unwrap().remove(&key);
            });
        }
    }
}
