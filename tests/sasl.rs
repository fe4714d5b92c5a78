//! Integration test for the SASL PLAIN handshake against a fake server.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use slirc_client::{Client, ClientConfig, Sasl};
use std::sync::Arc;

// base64("saslbot\0saslbot\0hunter2")
const EXPECTED_PAYLOAD: &str = "c2FzbGJvdABzYXNsYm90AGh1bnRlcjI=";

#[tokio::test]
async fn test_sasl_plain_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (sock, _) = listener.accept().await.unwrap();
        let (read, mut write) = sock.into_split();
        let mut lines = BufReader::new(read).lines();
        let mut observed = Vec::new();

        while let Some(line) = lines.next_line().await.unwrap() {
            match line.as_str() {
                "CAP REQ :sasl" => {
                    observed.push(line);
                    write
                        .write_all(b":srv CAP * ACK :sasl\r\n")
                        .await
                        .unwrap();
                }
                "AUTHENTICATE PLAIN" => {
                    observed.push(line);
                    write.write_all(b"AUTHENTICATE +\r\n").await.unwrap();
                }
                line_str if line_str.starts_with("AUTHENTICATE ") => {
                    observed.push(line_str.to_owned());
                    write
                        .write_all(b":srv 903 saslbot :SASL authentication successful\r\n")
                        .await
                        .unwrap();
                }
                "CAP END" => {
                    observed.push(line);
                    break;
                }
                // USER/NICK from the login that runs alongside.
                _ => {}
            }
        }
        observed
    });

    let client = Client::new(ClientConfig {
        nick: "saslbot".to_owned(),
        user: "saslbot".to_owned(),
        name: "SASL Bot".to_owned(),
        authenticator: Some(Arc::new(Sasl::plain("saslbot", "hunter2"))),
        ..ClientConfig::default()
    });

    client.connect(&addr).await.unwrap();
    let run = tokio::spawn({
        let client = client.clone();
        async move { client.run().await }
    });

    let observed = server.await.unwrap();
    run.abort();

    assert_eq!(
        observed,
        vec![
            "CAP REQ :sasl".to_owned(),
            "AUTHENTICATE PLAIN".to_owned(),
            format!("AUTHENTICATE {EXPECTED_PAYLOAD}"),
            "CAP END".to_owned(),
        ]
    );
}

#[tokio::test]
async fn test_sasl_aborts_on_nak() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (sock, _) = listener.accept().await.unwrap();
        let (read, mut write) = sock.into_split();
        let mut lines = BufReader::new(read).lines();

        while let Some(line) = lines.next_line().await.unwrap() {
            match line.as_str() {
                "CAP REQ :sasl" => {
                    write
                        .write_all(b":srv CAP * NAK :sasl\r\n")
                        .await
                        .unwrap();
                }
                "CAP END" => return true,
                _ => {}
            }
        }
        false
    });

    let client = Client::new(ClientConfig {
        nick: "saslbot".to_owned(),
        user: "saslbot".to_owned(),
        name: "SASL Bot".to_owned(),
        authenticator: Some(Arc::new(Sasl::plain("saslbot", "hunter2"))),
        ..ClientConfig::default()
    });

    client.connect(&addr).await.unwrap();
    let run = tokio::spawn({
        let client = client.clone();
        async move { client.run().await }
    });

    assert!(server.await.unwrap(), "CAP END never arrived after NAK");
    run.abort();
}
