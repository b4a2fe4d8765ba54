// MIT License - Copyright (c) 2026 Peter Wright
// Command gate: one transaction in flight, replies routed back to callers

use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::constants::RELOAD_NOTIFICATION;
use crate::event::CommandReply;
use crate::shutdown::Shutdown;
use crate::transport::BoxedWriter;

/// A command waiting to be written, with the slot its reply goes to.
#[derive(Debug)]
pub(crate) struct Submission {
    /// First token of the encoded command.
    pub name: String,
    /// Full wire line including the trailing newline.
    pub line: String,
    pub reply_tx: oneshot::Sender<CommandReply>,
}

impl Submission {
    pub fn new(tokens: &[String]) -> (Self, oneshot::Receiver<CommandReply>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        let submission = Self {
            name: tokens.first().cloned().unwrap_or_default(),
            line: format!("{}\n", tokens.join(" ")),
            reply_tx,
        };
        (submission, reply_rx)
    }
}

/// Write side of a connection.
///
/// Accepts one submission at a time, writes it, then stops accepting until
/// the reader hands over a reply. Configuration reload notifications pass
/// through without touching that slot.
pub(crate) struct CommandGate {
    writer: BoxedWriter,
    commands: mpsc::Receiver<Submission>,
    replies: mpsc::Receiver<CommandReply>,
    shutdown: Shutdown,
    awaiting: Option<oneshot::Sender<CommandReply>>,
}

impl CommandGate {
    pub fn new(
        writer: BoxedWriter,
        commands: mpsc::Receiver<Submission>,
        replies: mpsc::Receiver<CommandReply>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            writer,
            commands,
            replies,
            shutdown,
            awaiting: None,
        }
    }

    /// Run until shutdown or a write failure, handing the writer back so the
    /// caller can close it.
    pub async fn run(mut self) -> BoxedWriter {
        let shutdown = self.shutdown.clone();
        loop {
            // Replies already parsed are routed before a new command is taken,
            // so none of them can reach a caller that submitted afterwards.
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                Some(reply) = self.replies.recv() => self.route(reply),
                Some(submission) = self.commands.recv(), if self.awaiting.is_none() => {
                    if !self.transmit(submission).await {
                        break;
                    }
                }
            }
        }
        self.writer
    }

    /// Write one command. Returns false if the connection is finished.
    async fn transmit(&mut self, submission: Submission) -> bool {
        if submission.reply_tx.is_closed() {
            debug!(command = %submission.name, "Caller gave up before sending, skipping command");
            return true;
        }

        debug!(command = %submission.name, "Sending command: {}", submission.line.trim_end());
        let written = tokio::select! {
            _ = self.shutdown.cancelled() => return false,
            res = self.writer.write_all(submission.line.as_bytes()) => res,
        };
        if let Err(e) = written {
            error!("Error writing to lircd socket: {}", e);
            self.shutdown.fail(e.into());
            return false;
        }

        // No other command goes out until this one's reply has been routed.
        self.awaiting = Some(submission.reply_tx);
        true
    }

    fn route(&mut self, reply: CommandReply) {
        if reply.command == RELOAD_NOTIFICATION {
            info!("lircd has been reloaded");
            return;
        }

        match self.awaiting.take() {
            Some(reply_tx) => {
                debug!(command = %reply.command, success = reply.success, "Routing reply");
                if reply_tx.send(reply).is_err() {
                    debug!("Caller stopped waiting, discarding reply");
                }
            }
            None => warn!(
                command = %reply.command,
                "Reply received with no command outstanding, discarding"
            ),
        }
    }
}
