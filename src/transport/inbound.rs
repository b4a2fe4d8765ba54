// MIT License - Copyright (c) 2026 Peter Wright
// Read loop: lines from lircd to events and replies

use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::error::LircError;
use crate::event::{ButtonPress, CommandReply, EventSender};
use crate::reader::{Message, ProtocolReader};
use crate::shutdown::Shutdown;
use crate::transport::lines::LineReader;

/// Feed every line from lircd to a [`ProtocolReader`] until shutdown.
///
/// Events go to `events`, completed replies to the command gate through
/// `replies`. End of stream and read errors are recorded as the shutdown
/// cause; protocol errors are logged and the loop carries on.
pub(crate) async fn read_loop<R: AsyncRead + Unpin>(
    mut lines: LineReader<R>,
    events: EventSender,
    replies: mpsc::Sender<CommandReply>,
    shutdown: Shutdown,
) {
    let mut reader = ProtocolReader::new();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("lircd closed the connection");
                shutdown.fail(LircError::Disconnected);
                break;
            }
            Err(e) => {
                error!("Error reading from lircd socket: {}", e);
                shutdown.fail(e);
                break;
            }
        };
        trace!(line = %line, "line from lircd");

        let state = reader.state();
        let declared = reader.declared_len();
        let consumed = reader.consumed_len();
        match reader.read_line(&line) {
            Ok(Some(Message::Event(event))) => deliver_event(&events, event, &shutdown).await,
            Ok(Some(Message::Reply(reply))) => {
                tokio::select! {
                    _ = shutdown.cancelled() => {}
                    res = replies.send(reply) => {
                        if res.is_err() {
                            debug!("Command gate has stopped, dropping reply");
                        }
                    }
                }
            }
            Ok(None) => {}
            Err(e) => warn!(
                state = %state,
                line = %line,
                declared,
                consumed,
                "lirc protocol error, discarding line: {}",
                e
            ),
        }
    }
}

async fn deliver_event(events: &EventSender, event: ButtonPress, shutdown: &Shutdown) {
    let button = event.button_name.clone();
    tokio::select! {
        _ = shutdown.cancelled() => {
            debug!(button = %button, "Shutting down, dropping button press");
        }
        res = events.send(event) => {
            if res.is_err() {
                debug!("Event receiver dropped, discarding button press");
            }
        }
    }
}
