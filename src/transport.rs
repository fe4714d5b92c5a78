//! TCP and TLS transports for the client connection.
//!
//! A dialed socket is wrapped in a [`Framed`] line codec and then split
//! once: the write loop owns the sink, the read loop owns the stream.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::ClientConfig;
use tokio_rustls::TlsConnector;
use tokio_util::codec::Framed;
use tracing::warn;

use crate::error::ClientError;
use crate::line::LineCodec;

/// Object-safe socket bound: plain TCP and TLS streams both satisfy it.
pub(crate) trait Socket: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Socket for T {}

pub(crate) type LineStream = Framed<Box<dyn Socket>, LineCodec>;
pub(crate) type LineSink = SplitSink<LineStream, String>;
pub(crate) type LineSource = SplitStream<LineStream>;

/// Dials a plain TCP connection and frames it.
pub(crate) async fn connect_tcp(addr: &str) -> Result<LineStream, ClientError> {
    let stream = TcpStream::connect(addr).await?;
    if let Err(err) = enable_keepalive(&stream) {
        warn!("failed to enable TCP keepalive: {err}");
    }
    Ok(Framed::new(Box::new(stream) as Box<dyn Socket>, LineCodec::new()))
}

/// Dials a TLS connection and frames it. The server name for certificate
/// verification is taken from the host portion of `addr`.
pub(crate) async fn connect_tls(
    addr: &str,
    config: Arc<ClientConfig>,
) -> Result<LineStream, ClientError> {
    let stream = TcpStream::connect(addr).await?;
    if let Err(err) = enable_keepalive(&stream) {
        warn!("failed to enable TCP keepalive: {err}");
    }

    let host = addr.rsplit_once(':').map_or(addr, |(host, _)| host);
    let server_name = ServerName::try_from(host.to_owned())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let stream = TlsConnector::from(config).connect(server_name, stream).await?;
    Ok(Framed::new(Box::new(stream) as Box<dyn Socket>, LineCodec::new()))
}

fn enable_keepalive(stream: &TcpStream) -> io::Result<()> {
    use socket2::{SockRef, TcpKeepalive};

    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}
