//! Simple IRC bot example.
//!
//! Connects to a server, joins a channel once registration completes, and
//! echoes back any channel line that starts with `!echo`.
//!
//! ```text
//! cargo run --example simple_bot
//! ```

use std::sync::Arc;

use slirc_client::{Client, ClientConfig, RegexpMux, TracingLogger, CONNECTED_SIGNAL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mux = Arc::new(RegexpMux::new());

    mux.handle_fn(CONNECTED_SIGNAL, |client: Client, _msg| async move {
        client.join("#slirc-demo", None).await;
    });

    let echo_mux = Arc::clone(&mux);
    mux.handle_fn("PRIVMSG/^!echo (.+)$", move |client: Client, msg| {
        let mux = Arc::clone(&echo_mux);
        async move {
            if let Some(vars) = mux.vars(&msg) {
                client.reply_split(&msg, &vars[1], 350).await;
            }
        }
    });

    mux.handle_fn("ctcp:VERSION", |client: Client, msg| async move {
        client.reply_ctcp(&msg, "VERSION slirc-client demo").await;
    });

    let client = Client::new(ClientConfig {
        nick: "slirc-demo".to_owned(),
        user: "slirc".to_owned(),
        name: "slirc-client demo bot".to_owned(),
        mux: Some(mux),
        logger: Some(Arc::new(TracingLogger)),
        ..ClientConfig::default()
    });

    client.connect("irc.libera.chat:6667").await?;
    let err = client.run().await;
    eprintln!("connection terminated: {err}");
    Ok(())
}
