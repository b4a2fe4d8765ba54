// MIT License - Copyright (c) 2026 Peter Wright
// Endpoints and byte streams to lircd

pub(crate) mod command;
pub(crate) mod inbound;
pub(crate) mod lines;

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};
use tracing::{debug, error};

use crate::constants::DEFAULT_TCP_PORT;
use crate::error::{LircError, Result};

pub(crate) type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
pub(crate) type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Where lircd listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Local stream socket, usually `/var/run/lirc/lircd`.
    Unix(PathBuf),
    /// `host:port` of a lircd started with `--listen`.
    Tcp(String),
}

impl Endpoint {
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Endpoint::Unix(path.into())
    }

    /// TCP endpoint; lircd's default port is used when `host` has none.
    pub fn tcp(host: impl Into<String>) -> Self {
        Endpoint::Tcp(with_default_port(host.into()))
    }

    /// Connect and split the stream into its read and write halves.
    pub(crate) async fn dial(&self) -> Result<Stream> {
        debug!(endpoint = %self, "dialing lircd");
        let dialed = match self {
            Endpoint::Unix(path) => UnixStream::connect(path).await.map(|stream| {
                let (reader, writer) = stream.into_split();
                Stream {
                    reader: Box::new(reader),
                    writer: Box::new(writer),
                    peer: path.display().to_string(),
                }
            }),
            Endpoint::Tcp(host) => TcpStream::connect(host.as_str()).await.and_then(|stream| {
                let peer = stream.peer_addr()?.to_string();
                let (reader, writer) = stream.into_split();
                Ok(Stream {
                    reader: Box::new(reader),
                    writer: Box::new(writer),
                    peer,
                })
            }),
        };

        dialed.map_err(|e| {
            error!(endpoint = %self, "cannot dial lircd: {}", e);
            LircError::Dial {
                endpoint: self.to_string(),
                source: Arc::new(e),
            }
        })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
            Endpoint::Tcp(host) => write!(f, "tcp:{}", host),
        }
    }
}

/// A connected stream to lircd.
pub(crate) struct Stream {
    pub reader: BoxedReader,
    pub writer: BoxedWriter,
    pub peer: String,
}

fn with_default_port(host: String) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        return host;
    }
    if host.starts_with('[') && host.ends_with(']') {
        return format!("{}:{}", host, DEFAULT_TCP_PORT);
    }
    match host.rsplit_once(':') {
        // Bare IPv6 address.
        Some((addr, _)) if addr.contains(':') => format!("[{}]:{}", host, DEFAULT_TCP_PORT),
        Some(_) => host,
        None => format!("{}:{}", host, DEFAULT_TCP_PORT),
    }
}
