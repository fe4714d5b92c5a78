//! Connection owner: dialing, the read/write/keepalive loops, session
//! state, and the outbound send primitives.
//!
//! A [`Client`] is a cheap-to-clone handle; every handler receives one and
//! may call its send primitives concurrently. Outbound lines are
//! serialized through a single-consumer channel, so concurrent sends are
//! linearized and never interleave on the wire.
//!
//! The quit token, cancelled by the first terminal error, is the single
//! shutdown signal: every potentially-blocking operation owned by the
//! client selects on it, including [`Client::send`], which silently drops
//! its line once the connection is gone rather than deadlocking.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_rustls::rustls;
use tokio_util::sync::CancellationToken;

use crate::error::ClientError;
use crate::isupport::Isupport;
use crate::logger::{Logger, NullLogger};
use crate::message::Message;
use crate::mux::{Mux, Muxer};
use crate::response::{
    ERR_NOMOTD, RPL_BANLIST, RPL_CHANNELMODEIS, RPL_CREATED, RPL_ISUPPORT, RPL_MYINFO,
    RPL_NAMEREPLY, RPL_WELCOME, RPL_YOURHOST,
};
use crate::split::split_message;
use crate::transport::{self, LineSink, LineSource, LineStream};

/// Signal of the synthetic message dispatched once the registration
/// handshake completes. Fired exactly once per lifecycle, before the
/// triggering numeric reaches user handlers.
pub const CONNECTED_SIGNAL: &str = "irc:connected";

/// Socket read/write deadline, refreshed on every successful operation.
pub const SOCKET_DEADLINE: Duration = Duration::from_secs(240);

/// Interval between keepalive PINGs.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(120);

/// Runs a registration handshake on behalf of the client, e.g. SASL.
/// Started on its own task when the client begins processing; a client
/// without one falls back to [`Client::login`].
pub trait Authenticator: Send + Sync {
    /// Drives the handshake. Typically registers handlers on the
    /// client's mux and then issues the opening commands.
    fn authenticate(&self, client: Client) -> BoxFuture<'static, ()>;
}

/// Configuration consumed by [`Client::new`].
#[derive(Default)]
pub struct ClientConfig {
    /// Username for the USER command.
    pub user: String,
    /// Nickname requested at registration.
    pub nick: String,
    /// Real name for the USER command.
    pub name: String,
    /// Server password, sent as PASS before registration when present.
    pub password: Option<String>,
    /// TLS configuration for [`Client::connect_tls`].
    pub tls: Option<Arc<rustls::ClientConfig>>,
    /// Routing table. A fresh [`Mux`] when absent.
    pub mux: Option<Arc<dyn Muxer>>,
    /// Registration driver. Plain [`Client::login`] when absent.
    pub authenticator: Option<Arc<dyn Authenticator>>,
    /// Traffic logger. [`NullLogger`] when absent.
    pub logger: Option<Arc<dyn Logger>>,
}

#[derive(Default)]
struct Session {
    current_nick: String,
    registration: HashSet<String>,
    welcomed: bool,
    dead: bool,
    terminal: Option<ClientError>,
}

/// Per-dial runtime state.
struct Conn {
    sender: Option<mpsc::Sender<String>>,
    quit: CancellationToken,
    source: Option<LineSource>,
}

struct Inner {
    user: String,
    nick: String,
    name: String,
    password: Option<String>,
    tls: Option<Arc<rustls::ClientConfig>>,
    mux: Arc<dyn Muxer>,
    logger: Arc<dyn Logger>,
    authenticator: Option<Arc<dyn Authenticator>>,
    isupport: RwLock<Isupport>,
    session: RwLock<Session>,
    conn: Mutex<Conn>,
}

/// An IRC client connection.
///
/// Lifecycle: *fresh* → *connected* ([`connect`](Client::connect) /
/// [`connect_tls`](Client::connect_tls)) → *registered* (handshake
/// complete) → *dead* (first terminal error). A dead client refuses
/// further dials with [`ClientError::DeadClient`].
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Creates a client from a configuration, filling in the default mux
    /// and logger where absent.
    pub fn new(config: ClientConfig) -> Client {
        let mux: Arc<dyn Muxer> = config.mux.unwrap_or_else(|| Arc::new(Mux::new()));
        let logger: Arc<dyn Logger> = config.logger.unwrap_or_else(|| Arc::new(NullLogger));
        Client {
            inner: Arc::new(Inner {
                user: config.user,
                nick: config.nick,
                name: config.name,
                password: config.password,
                tls: config.tls,
                mux,
                logger,
                authenticator: config.authenticator,
                isupport: RwLock::new(Isupport::new()),
                session: RwLock::new(Session::default()),
                conn: Mutex::new(Conn {
                    sender: None,
                    quit: CancellationToken::new(),
                    source: None,
                }),
            }),
        }
    }

    /// The client's routing table.
    pub fn mux(&self) -> &Arc<dyn Muxer> {
        &self.inner.mux
    }

    /// Read access to the negotiated session capabilities.
    pub fn isupport(&self) -> RwLockReadGuard<'_, Isupport> {
        self.inner.isupport.read().unwrap()
    }

    /// The nickname the server currently knows this client by.
    pub fn current_nick(&self) -> String {
        self.inner.session.read().unwrap().current_nick.clone()
    }

    /// Reports whether the registration handshake has completed.
    pub fn registered(&self) -> bool {
        registration_complete(&self.inner.session.read().unwrap().registration)
    }

    /// Dials a plain TCP connection.
    pub async fn connect(&self, addr: &str) -> Result<(), ClientError> {
        self.ensure_alive()?;
        let stream = transport::connect_tcp(addr).await?;
        self.init(stream);
        Ok(())
    }

    /// Dials a TLS connection using the configured TLS client config.
    pub async fn connect_tls(&self, addr: &str) -> Result<(), ClientError> {
        self.ensure_alive()?;
        let tls = self
            .inner
            .tls
            .clone()
            .ok_or(ClientError::TlsConfigMissing)?;
        let stream = transport::connect_tls(addr, tls).await?;
        self.init(stream);
        Ok(())
    }

    fn ensure_alive(&self) -> Result<(), ClientError> {
        if self.inner.session.read().unwrap().dead {
            return Err(ClientError::DeadClient);
        }
        Ok(())
    }

    /// Resets per-connection state and starts the write loop.
    fn init(&self, stream: LineStream) {
        {
            let mut session = self.inner.session.write().unwrap();
            session.current_nick.clear();
            session.registration.clear();
            session.welcomed = false;
        }
        *self.inner.isupport.write().unwrap() = Isupport::new();

        let (sink, source) = stream.split();
        let (tx, rx) = mpsc::channel(1);
        let quit = CancellationToken::new();
        {
            let mut conn = self.inner.conn.lock().unwrap();
            conn.sender = Some(tx);
            conn.quit = quit.clone();
            conn.source = Some(source);
        }
        tokio::spawn(self.clone().write_loop(sink, rx, quit));
    }

    /// Processes the connection until a terminal error is observed and
    /// returns that error.
    ///
    /// Starts the keepalive loop and the authenticator (or plain
    /// [`login`](Client::login)), then runs the read loop on the calling
    /// task. Incoming lines are parsed, bookkept and dispatched strictly
    /// in arrival order.
    pub async fn run(&self) -> ClientError {
        let (quit, source) = {
            let mut conn = self.inner.conn.lock().unwrap();
            (conn.quit.clone(), conn.source.take())
        };
        let Some(mut source) = source else {
            return ClientError::NotConnected;
        };

        tokio::spawn(self.clone().keepalive_loop(quit.clone()));

        match self.inner.authenticator.clone() {
            Some(authenticator) => {
                let client = self.clone();
                tokio::spawn(async move { authenticator.authenticate(client).await });
            }
            None => {
                let client = self.clone();
                tokio::spawn(async move { client.login().await });
            }
        }

        loop {
            let next = tokio::select! {
                _ = quit.cancelled() => break,
                next = tokio::time::timeout(SOCKET_DEADLINE, source.next()) => next,
            };
            match next {
                Err(_) => {
                    self.fail(ClientError::Timeout);
                    break;
                }
                Ok(None) => {
                    self.fail(ClientError::ConnectionClosed);
                    break;
                }
                Ok(Some(Err(err))) => {
                    self.fail(err.into());
                    break;
                }
                Ok(Some(Ok(line))) => {
                    if line.is_empty() {
                        continue;
                    }
                    let msg = Message::parse(&line);
                    self.inner.logger.incoming(&msg);
                    self.bookkeep(&msg).await;

                    if matches!(msg.command.as_str(), "PRIVMSG" | "NOTICE") {
                        if let Ok(ctcp) = msg.ctcp() {
                            let mut copy = msg.clone();
                            copy.signal = format!("ctcp:{}", ctcp.command);
                            self.inner.mux.process(self, &copy);
                        }
                    }
                    self.inner.mux.process(self, &msg);
                }
            }
        }

        let mut session = self.inner.session.write().unwrap();
        session.terminal.take().unwrap_or(ClientError::ConnectionClosed)
    }

    /// Per-command bookkeeping, performed before the message is fanned
    /// out to handlers.
    async fn bookkeep(&self, msg: &Message) {
        match msg.command.as_str() {
            "PING" => {
                let token = msg.params.first().map(String::as_str).unwrap_or("");
                self.send(format!("PONG {token}")).await;
            }
            RPL_ISUPPORT => {
                self.inner.isupport.write().unwrap().parse(msg);
            }
            RPL_WELCOME | RPL_YOURHOST | RPL_CREATED | RPL_MYINFO | ERR_NOMOTD => {
                let fire = {
                    let mut session = self.inner.session.write().unwrap();
                    session.registration.insert(msg.command.clone());
                    if let Some(nick) = msg.params.first() {
                        session.current_nick = nick.clone();
                    }
                    let complete = registration_complete(&session.registration);
                    if complete && !session.welcomed {
                        session.welcomed = true;
                        true
                    } else {
                        false
                    }
                };
                if fire {
                    self.inner
                        .mux
                        .process(self, &Message::synthetic(CONNECTED_SIGNAL));
                }
            }
            "NICK" => {
                let mut session = self.inner.session.write().unwrap();
                if msg.prefix.nick == session.current_nick {
                    if let Some(nick) = msg.params.first() {
                        session.current_nick = nick.clone();
                    }
                }
            }
            _ => {}
        }
    }

    /// Consumes the send channel and writes each line to the socket.
    async fn write_loop(
        self,
        mut sink: LineSink,
        mut rx: mpsc::Receiver<String>,
        quit: CancellationToken,
    ) {
        loop {
            let line = tokio::select! {
                _ = quit.cancelled() => break,
                line = rx.recv() => match line {
                    Some(line) => line,
                    None => break,
                },
            };
            self.inner.logger.outgoing(&line);
            match tokio::time::timeout(SOCKET_DEADLINE, sink.send(line)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    self.fail(err.into());
                    break;
                }
                Err(_) => {
                    self.fail(ClientError::Timeout);
                    break;
                }
            }
        }
    }

    /// Enqueues `PING :0` every [`KEEPALIVE_INTERVAL`] until shutdown.
    async fn keepalive_loop(self, quit: CancellationToken) {
        let mut ticker = tokio::time::interval(KEEPALIVE_INTERVAL);
        // The first tick fires immediately, we don't want that.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = quit.cancelled() => break,
                _ = ticker.tick() => self.send("PING :0").await,
            }
        }
    }

    /// Records the first terminal error, marks the client dead and
    /// cancels the quit token, unblocking every loop and pending send.
    /// Idempotent; later errors are discarded.
    fn fail(&self, err: ClientError) {
        {
            let mut session = self.inner.session.write().unwrap();
            if session.terminal.is_none() {
                session.terminal = Some(err);
            }
            session.dead = true;
        }
        let quit = self.inner.conn.lock().unwrap().quit.clone();
        quit.cancel();
    }

    /// Queues one line for the write loop. Cancelled sends (the client
    /// shut down while waiting) silently drop the line.
    pub async fn send(&self, line: impl Into<String>) {
        let line = line.into();
        let (sender, quit) = {
            let conn = self.inner.conn.lock().unwrap();
            (conn.sender.clone(), conn.quit.clone())
        };
        let Some(sender) = sender else {
            return;
        };
        tokio::select! {
            _ = quit.cancelled() => {}
            _ = sender.send(line) => {}
        }
    }

    /// Performs the plain registration handshake: PASS (when configured),
    /// USER, NICK.
    pub async fn login(&self) {
        if let Some(password) = &self.inner.password {
            self.send(format!("PASS {password}")).await;
        }
        self.send(format!("USER {} 0 * :{}", self.inner.user, self.inner.name))
            .await;
        self.send(format!("NICK {}", self.inner.nick)).await;
    }

    /// Sends a PRIVMSG to a target.
    pub async fn privmsg(&self, target: &str, text: &str) {
        self.send(format!("PRIVMSG {target} :{text}")).await;
    }

    /// Sends a PRIVMSG, split into lines of at most `limit` bytes. See
    /// [`split_message`] for how the splitting is done.
    pub async fn privmsg_split(&self, target: &str, text: &str, limit: usize) {
        for line in split_message(&format!("PRIVMSG {target} :{text}"), limit) {
            self.send(line).await;
        }
    }

    /// Sends a NOTICE to a target.
    pub async fn notice(&self, target: &str, text: &str) {
        self.send(format!("NOTICE {target} :{text}")).await;
    }

    /// Sends a NOTICE, split into lines of at most `limit` bytes. See
    /// [`split_message`] for how the splitting is done.
    pub async fn notice_split(&self, target: &str, text: &str, limit: usize) {
        for line in split_message(&format!("NOTICE {target} :{text}"), limit) {
            self.send(line).await;
        }
    }

    /// Replies to a PRIVMSG or NOTICE, addressing the channel it arrived
    /// on, or its sender for a direct message.
    ///
    /// # Panics
    ///
    /// Panics (through the logger) when the message is neither a PRIVMSG
    /// nor a NOTICE.
    pub async fn reply(&self, msg: &Message, response: &str) {
        let target = self.reply_target(msg);
        self.privmsg(&target, response).await;
    }

    /// Like [`reply`](Client::reply), split into lines of at most `limit`
    /// bytes.
    pub async fn reply_split(&self, msg: &Message, response: &str, limit: usize) {
        let target = self.reply_target(msg);
        self.privmsg_split(&target, response, limit).await;
    }

    /// Replies with a CTCP response, wrapped in 0x01 delimiters and sent
    /// as a NOTICE per CTCP convention.
    ///
    /// # Panics
    ///
    /// Panics (through the logger) when the message is neither a PRIVMSG
    /// nor a NOTICE.
    pub async fn reply_ctcp(&self, msg: &Message, response: &str) {
        let target = self.reply_target(msg);
        self.notice(&target, &format!("\u{1}{response}\u{1}")).await;
    }

    fn reply_target(&self, msg: &Message) -> String {
        if !matches!(msg.command.as_str(), "PRIVMSG" | "NOTICE") {
            self.inner
                .logger
                .panic(&format!("cannot reply to {}", msg.command));
        }
        match self.channel_for_msg(msg) {
            Some(channel) => channel,
            // Sent to us directly; the reply goes back to the sender.
            None => msg.prefix.nick.clone(),
        }
    }

    /// Sends a JOIN, with an optional channel password.
    pub async fn join(&self, channel: &str, password: Option<&str>) {
        match password {
            Some(password) => self.send(format!("JOIN {channel} {password}")).await,
            None => self.send(format!("JOIN {channel}")).await,
        }
    }

    /// Requests a nickname change.
    pub async fn set_nick(&self, nick: &str) {
        self.send(format!("NICK {nick}")).await;
    }

    /// Extracts the channel a message concerns, when it concerns one.
    ///
    /// Command-specific parameter positions are consulted first; otherwise
    /// a parameter is a channel when its first character is one of the
    /// negotiated CHANTYPES.
    pub fn channel_for_msg(&self, msg: &Message) -> Option<String> {
        if msg.params.is_empty() {
            return None;
        }
        match msg.command.as_str() {
            "INVITE" | RPL_CHANNELMODEIS | RPL_BANLIST => msg.params.get(1).cloned(),
            RPL_NAMEREPLY => msg.params.get(2).cloned(),
            _ => {
                let isupport = self.inner.isupport.read().unwrap();
                let is_channel = |param: &str| {
                    param
                        .chars()
                        .next()
                        .is_some_and(|c| isupport.chan_types.contains(&c))
                };
                if is_channel(&msg.params[0]) {
                    return Some(msg.params[0].clone());
                }
                if msg.is_numeric() {
                    if let Some(second) = msg.params.get(1) {
                        if is_channel(second) {
                            return Some(second.clone());
                        }
                    }
                }
                None
            }
        }
    }
}

fn registration_complete(registration: &HashSet<String>) -> bool {
    registration.contains(ERR_NOMOTD)
        || (registration.contains(RPL_WELCOME)
            && registration.contains(RPL_YOURHOST)
            && registration.contains(RPL_CREATED)
            && registration.contains(RPL_MYINFO))
}
