//! Integration tests driving a [`Client`] against an in-process fake
//! server on a loopback listener.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use slirc_client::{handler_fn, Client, ClientConfig, ClientError, CONNECTED_SIGNAL};

async fn listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

fn test_config() -> ClientConfig {
    ClientConfig {
        nick: "testbot".to_owned(),
        user: "testbot".to_owned(),
        name: "Test Bot".to_owned(),
        ..ClientConfig::default()
    }
}

/// Accepts one connection, writes `script`, then closes the write side
/// gracefully. The read side is drained so the close never turns into a
/// connection reset while client traffic is still in flight.
async fn serve_script(listener: TcpListener, script: &'static str) {
    let (sock, _) = listener.accept().await.unwrap();
    let (mut read, mut write) = sock.into_split();
    let drain = tokio::spawn(async move {
        let mut buf = [0u8; 1024];
        while matches!(read.read(&mut buf).await, Ok(n) if n > 0) {}
    });

    write.write_all(script.as_bytes()).await.unwrap();
    // Leave time for the client to process before the FIN arrives.
    tokio::time::sleep(Duration::from_millis(200)).await;
    drop(write);
    drain.await.unwrap();
}

#[tokio::test]
async fn test_registration_dispatches_connected_once_before_trigger() {
    let (listener, addr) = listener().await;
    let server = tokio::spawn(serve_script(
        listener,
        ":srv 001 testbot :Welcome\r\n\
         :srv 002 testbot :Your host is srv\r\n\
         :srv 003 testbot :This server was created yesterday\r\n\
         :srv 004 testbot srv 1.0 ao mtov\r\n\
         :srv 422 testbot :MOTD File is missing\r\n",
    ));

    let client = Client::new(test_config());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for signal in [CONNECTED_SIGNAL, "004"] {
        let tx = tx.clone();
        client.mux().handle(
            signal,
            handler_fn(move |_client, msg| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(msg.signal.clone());
                }
            }),
        );
    }

    client.connect(&addr).await.unwrap();
    let err = client.run().await;
    assert!(matches!(err, ClientError::ConnectionClosed), "got {err}");
    server.await.unwrap();
    assert!(client.registered());
    assert_eq!(client.current_nick(), "testbot");

    // Let the dispatched handler tasks drain.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    // Exactly one synthetic connected dispatch, ordered before the
    // triggering 004 reaches user handlers; the trailing 422 must not
    // re-fire it.
    assert_eq!(events, vec![CONNECTED_SIGNAL.to_owned(), "004".to_owned()]);
}

#[tokio::test]
async fn test_ping_answered_with_pong() {
    let (listener, addr) = listener().await;
    let server = tokio::spawn(async move {
        let (sock, _) = listener.accept().await.unwrap();
        let (read, mut write) = sock.into_split();
        write.write_all(b"PING :12345\r\n").await.unwrap();

        let mut lines = BufReader::new(read).lines();
        loop {
            let line = lines
                .next_line()
                .await
                .unwrap()
                .expect("connection closed before PONG");
            if line == "PONG 12345" {
                break;
            }
        }
    });

    let client = Client::new(test_config());
    client.connect(&addr).await.unwrap();
    let run = tokio::spawn({
        let client = client.clone();
        async move { client.run().await }
    });

    server.await.unwrap();
    run.abort();
}

#[tokio::test]
async fn test_nick_tracking_follows_own_nick_only() {
    let (listener, addr) = listener().await;
    let server = tokio::spawn(serve_script(
        listener,
        ":srv 001 testbot :Welcome\r\n\
         :other!u@h NICK :somebody\r\n\
         :testbot!u@h NICK :newnick\r\n",
    ));

    let client = Client::new(test_config());
    client.connect(&addr).await.unwrap();
    client.run().await;
    server.await.unwrap();

    assert_eq!(client.current_nick(), "newnick");
}

#[tokio::test]
async fn test_isupport_folded_from_005() {
    let (listener, addr) = listener().await;
    let server = tokio::spawn(serve_script(
        listener,
        ":srv 001 testbot :Welcome\r\n\
         :srv 005 testbot NICKLEN=32 CHANTYPES=#& NETWORK=testnet :are supported by this server\r\n",
    ));

    let client = Client::new(test_config());
    client.connect(&addr).await.unwrap();
    client.run().await;
    server.await.unwrap();

    let isupport = client.isupport();
    assert_eq!(isupport.nick_len, 32);
    assert_eq!(isupport.chan_types, vec!['#', '&']);
    assert_eq!(isupport.network, "testnet");
}

#[tokio::test]
async fn test_ctcp_gets_extra_dispatch() {
    let (listener, addr) = listener().await;
    let server = tokio::spawn(serve_script(
        listener,
        ":n!u@h PRIVMSG #chan :\u{1}VERSION\u{1}\r\n",
    ));

    let client = Client::new(test_config());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    for signal in ["ctcp:VERSION", "PRIVMSG"] {
        let tx = tx.clone();
        client.mux().handle(
            signal,
            handler_fn(move |_client, msg| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send((msg.signal.clone(), msg.command.clone()));
                }
            }),
        );
    }

    client.connect(&addr).await.unwrap();
    client.run().await;
    server.await.unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    // The synthetic copy keeps the wire command but routes by CTCP signal.
    assert_eq!(
        events,
        vec![
            ("ctcp:VERSION".to_owned(), "PRIVMSG".to_owned()),
            ("PRIVMSG".to_owned(), "PRIVMSG".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_dead_client_refuses_redial() {
    let (listener, addr) = listener().await;
    let server = tokio::spawn(serve_script(listener, ""));

    let client = Client::new(test_config());
    client.connect(&addr).await.unwrap();
    let err = client.run().await;
    assert!(matches!(
        err,
        ClientError::ConnectionClosed | ClientError::Protocol(_)
    ));
    server.await.unwrap();

    assert!(matches!(
        client.connect(&addr).await,
        Err(ClientError::DeadClient)
    ));

    // Sends after termination return silently.
    client.send("PRIVMSG #chan :too late").await;
}

#[tokio::test(start_paused = true)]
async fn test_keepalive_ping_and_read_deadline() {
    let (listener, addr) = listener().await;
    let server = tokio::spawn(async move {
        let (sock, _) = listener.accept().await.unwrap();
        let (read, _write) = sock.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut saw_keepalive = false;
        while let Ok(Some(line)) = lines.next_line().await {
            if line == "PING :0" {
                saw_keepalive = true;
            }
        }
        saw_keepalive
    });

    let client = Client::new(test_config());
    client.connect(&addr).await.unwrap();
    // The paused clock auto-advances: the keepalive fires at 120s, the
    // silent server trips the read deadline at 240s.
    let err = client.run().await;
    assert!(matches!(err, ClientError::Timeout), "got {err}");

    assert!(server.await.unwrap(), "keepalive PING never arrived");
}
