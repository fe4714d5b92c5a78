//! Integration test for WHOIS coalescing through a live client.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use slirc_client::{Client, ClientConfig, Coalesce};

#[tokio::test]
async fn test_whois_delivered_as_batch() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let (sock, _) = listener.accept().await.unwrap();
        let (read, mut write) = sock.into_split();
        let mut lines = BufReader::new(read).lines();

        while let Some(line) = lines.next_line().await.unwrap() {
            if line == "WHOIS alice alice" {
                let replies = ":srv 311 me alice auser ahost * :Alice\r\n\
                    :srv 319 me alice :#rust #irc\r\n\
                    :srv 318 me alice :End of /WHOIS list\r\n";
                write.write_all(replies.as_bytes()).await.unwrap();
                break;
            }
        }
    });

    let client = Client::new(ClientConfig {
        nick: "me".to_owned(),
        user: "me".to_owned(),
        name: "Me".to_owned(),
        ..ClientConfig::default()
    });
    let coalesce = Arc::new(Coalesce::new());
    client.mux().handle("", coalesce.clone());

    client.connect(&addr).await.unwrap();
    let run = tokio::spawn({
        let client = client.clone();
        async move { client.run().await }
    });

    let batch = coalesce.whois(&client, "alice").await;
    server.await.unwrap();
    run.abort();

    let commands: Vec<&str> = batch.iter().map(|m| m.command.as_str()).collect();
    assert_eq!(commands, vec!["311", "319", "318"]);
    assert!(batch.iter().all(|m| m.params[1] == "alice"));
}
