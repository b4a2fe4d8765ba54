// MIT License - Copyright (c) 2026 Peter Wright
// Connection lifecycle: dial, run both loops, correlate command replies

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::constants::{COMMAND_TIMEOUT, DEFAULT_EVENT_CAPACITY};
use crate::error::{LircError, Result};
use crate::event::{event_channel, CommandReply, EventReceiver, EventSender};
use crate::protocol::{Command, SendStart, SendStop};
use crate::shutdown::Shutdown;
use crate::transport::command::{CommandGate, Submission};
use crate::transport::inbound::read_loop;
use crate::transport::lines::LineReader;
use crate::transport::Endpoint;

/// A connection to lircd.
///
/// Nothing happens until [`Connection::start`] is awaited; it dials lircd and
/// runs until [`Connection::disconnect`] is called or the stream fails.
/// Meanwhile button presses arrive on the receiver from
/// [`Connection::take_events`] and commands go through
/// [`Connection::send_command`]. A connection is used once: after `start`
/// returns, build a new one to reconnect.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use lirc_client::{Connection, Version};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let conn = Arc::new(Connection::unix("/var/run/lirc/lircd"));
///
///     let runner = {
///         let conn = conn.clone();
///         tokio::spawn(async move { conn.start().await })
///     };
///
///     let reply = conn.send_command(&Version).await?;
///     println!("lircd {}", reply.data.join(" "));
///
///     conn.disconnect();
///     runner.await??;
///     Ok(())
/// }
/// ```
pub struct Connection {
    endpoint: Endpoint,
    /// Held by a caller from submission until its reply or timeout.
    submit: tokio::sync::Mutex<()>,
    commands_tx: mpsc::Sender<Submission>,
    commands_rx: Mutex<Option<mpsc::Receiver<Submission>>>,
    events_tx: EventSender,
    events_rx: Mutex<Option<EventReceiver>>,
    stop: Shutdown,
}

impl Connection {
    /// Connection to lircd over a local stream socket.
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self::new(Endpoint::unix(path), DEFAULT_EVENT_CAPACITY)
    }

    /// Connection to lircd over TCP. `host` may omit the port.
    pub fn tcp(host: impl Into<String>) -> Self {
        Self::new(Endpoint::tcp(host), DEFAULT_EVENT_CAPACITY)
    }

    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.endpoint.clone(), config.event_capacity))
    }

    fn new(endpoint: Endpoint, event_capacity: usize) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(1);
        let (events_tx, events_rx) = event_channel(event_capacity);
        Self {
            endpoint,
            submit: tokio::sync::Mutex::new(()),
            commands_tx,
            commands_rx: Mutex::new(Some(commands_rx)),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            stop: Shutdown::new(),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The button press receiver. Only the first call gets it.
    ///
    /// The channel is never closed while the connection exists; watch for
    /// [`Connection::start`] returning to detect the end. Until the receiver
    /// is drained, a full channel holds up the read loop and with it any
    /// command replies behind the pending press.
    pub fn take_events(&self) -> Option<EventReceiver> {
        self.events_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Request a clean shutdown. [`Connection::start`] then returns `Ok(())`
    /// unless a failure was recorded first.
    pub fn disconnect(&self) {
        info!(endpoint = %self.endpoint, "Disconnecting from lircd");
        self.stop.cancel();
    }

    /// Whether the connection has shut down or been asked to.
    pub fn is_closed(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Dial lircd and run the read loop and command gate until shutdown.
    ///
    /// Returns the dial error if the connection cannot be made, otherwise the
    /// first fatal error recorded by either loop, or `Ok(())` after
    /// [`Connection::disconnect`].
    pub async fn start(&self) -> Result<()> {
        let commands_rx = self
            .commands_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(LircError::AlreadyStarted)?;

        if self.stop.is_cancelled() {
            return self.stop.cause().map_or(Ok(()), Err);
        }

        let stream = self.endpoint.dial().await?;
        info!(endpoint = %self.endpoint, peer = %stream.peer, "Connected to lircd");

        let (replies_tx, replies_rx) = mpsc::channel(1);
        let gate = CommandGate::new(stream.writer, commands_rx, replies_rx, self.stop.clone());
        let reader = read_loop(
            LineReader::new(stream.reader),
            self.events_tx.clone(),
            replies_tx,
            self.stop.clone(),
        );

        let ((), mut writer) = tokio::join!(reader, gate.run());

        if let Err(e) = writer.shutdown().await {
            debug!("Error closing lircd socket: {}", e);
        }

        match self.stop.cause() {
            Some(cause) => {
                warn!(peer = %stream.peer, "lircd connection failed: {}", cause);
                Err(cause)
            }
            None => {
                info!(peer = %stream.peer, "lircd connection closed");
                Ok(())
            }
        }
    }

    /// Send a command and wait for its reply.
    ///
    /// Waits for any command already in flight, then for this command's
    /// reply for at most [`COMMAND_TIMEOUT`]. Wrap the call in
    /// [`tokio::time::timeout`] or drop the future to give up sooner.
    ///
    /// A reply reporting `ERROR` comes back as
    /// [`LircError::UnsuccessfulCommand`], one naming another command as
    /// [`LircError::UnexpectedReply`]; both carry the reply.
    pub async fn send_command<C: Command + ?Sized>(&self, command: &C) -> Result<CommandReply> {
        let (submission, reply_rx) = Submission::new(&command.encode());
        let expected = submission.name.clone();

        let _turn = tokio::select! {
            _ = self.stop.cancelled() => return Err(LircError::Cancelled),
            turn = self.submit.lock() => turn,
        };

        tokio::select! {
            _ = self.stop.cancelled() => return Err(LircError::Cancelled),
            sent = self.commands_tx.send(submission) => {
                if sent.is_err() {
                    return Err(LircError::Cancelled);
                }
            }
        }

        let reply = tokio::select! {
            _ = self.stop.cancelled() => return Err(LircError::Cancelled),
            reply = timeout(COMMAND_TIMEOUT, reply_rx) => match reply {
                Ok(Ok(reply)) => reply,
                Ok(Err(_)) => return Err(LircError::Cancelled),
                Err(_) => {
                    debug!(command = %expected, "Command timeout");
                    return Err(LircError::CommandTimeout { command: expected });
                }
            },
        };

        if reply.name() != expected {
            return Err(LircError::UnexpectedReply { expected, reply });
        }
        if !reply.success {
            return Err(LircError::UnsuccessfulCommand { reply });
        }
        Ok(reply)
    }

    /// Start repeating `button` on `remote` until the returned handle is
    /// stopped.
    pub async fn repeat_button(&self, remote: &str, button: &str) -> Result<Repeating<'_>> {
        self.send_command(&SendStart {
            remote: remote.to_string(),
            button: button.to_string(),
        })
        .await?;

        Ok(Repeating {
            connection: self,
            remote: remote.to_string(),
            button: button.to_string(),
        })
    }
}

/// A button lircd is repeating, from [`Connection::repeat_button`].
#[must_use = "the button keeps repeating until `stop` is called"]
pub struct Repeating<'a> {
    connection: &'a Connection,
    remote: String,
    button: String,
}

impl Repeating<'_> {
    /// Tell lircd to stop repeating. Failures are logged, not returned.
    pub async fn stop(self) {
        let command = SendStop {
            remote: self.remote,
            button: self.button,
        };
        if let Err(e) = self.connection.send_command(&command).await {
            warn!(
                remote = %command.remote,
                button = %command.button,
                "Failed to stop repeating button: {}",
                e
            );
        }
    }
}
