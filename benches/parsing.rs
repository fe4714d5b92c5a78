//! Benchmarks for message parsing, ISUPPORT folding and splitting.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use slirc_client::{split_message, Isupport, Message};

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Numeric response
const NUMERIC_RESPONSE: &str =
    ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

/// A realistic 005 advertisement
const ISUPPORT_MESSAGE: &str = ":irc.server.net 005 nickname CHANTYPES=# EXCEPTS INVEX \
    CHANMODES=eIbq,k,flj,CFLMPQScgimnprstuz CHANLIMIT=#:120 PREFIX=(ov)@+ MAXLIST=bqeI:100 \
    NETWORK=Libera.Chat STATUSMSG=@+ CASEMAPPING=rfc1459 NICKLEN=16 MAXNICKLEN=16 \
    TOPICLEN=390 :are supported by this server";

/// Long outbound line that needs fragmenting
const LONG_PRIVMSG: &str = "PRIVMSG #channel :The quick brown fox jumps over the lazy dog, \
    then does it again and again until the line is comfortably past any sane byte budget \
    for a single IRC message on a standard network.";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("simple_ping", |b| {
        b.iter(|| black_box(Message::parse(black_box(SIMPLE_MESSAGE))))
    });

    group.bench_function("with_prefix", |b| {
        b.iter(|| black_box(Message::parse(black_box(PREFIX_MESSAGE))))
    });

    group.bench_function("numeric", |b| {
        b.iter(|| black_box(Message::parse(black_box(NUMERIC_RESPONSE))))
    });

    group.finish();
}

fn benchmark_isupport(c: &mut Criterion) {
    let msg = Message::parse(ISUPPORT_MESSAGE);
    c.bench_function("isupport_fold", |b| {
        b.iter(|| {
            let mut isupport = Isupport::new();
            isupport.parse(black_box(&msg));
            black_box(isupport)
        })
    });
}

fn benchmark_split(c: &mut Criterion) {
    c.bench_function("split_message", |b| {
        b.iter(|| black_box(split_message(black_box(LONG_PRIVMSG), 120)))
    });
}

criterion_group!(benches, benchmark_parsing, benchmark_isupport, benchmark_split);
criterion_main!(benches);
