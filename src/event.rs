// MIT License - Copyright (c) 2026 Peter Wright
// Decoded lircd messages

use serde::Serialize;

/// A button press broadcast by lircd.
///
/// Receivers get these through the channel returned by
/// [`Connection::take_events`](crate::Connection::take_events).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonPress {
    /// First two bytes of the 16 hex digit code, read little-endian.
    /// Kept for compatibility only; applications should ignore it.
    pub code: u16,
    /// How long the button has been held: 0 for a new press, incremented
    /// for each repeated signal.
    pub repeat_count: u32,
    /// Key name as defined in lircd.conf.
    pub button_name: String,
    /// Remote name as defined in lircd.conf.
    pub remote_control_name: String,
}

/// The reply lircd sends for a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandReply {
    /// Command line echoed by lircd, arguments included.
    pub command: String,
    /// Whether lircd reported SUCCESS.
    pub success: bool,
    /// Data lines of the reply payload, in order.
    pub data: Vec<String>,
}

impl CommandReply {
    /// First token of the echoed command line.
    pub fn name(&self) -> &str {
        self.command.split_whitespace().next().unwrap_or_default()
    }
}

/// Sending half of the event channel, held by the read loop.
pub type EventSender = tokio::sync::mpsc::Sender<ButtonPress>;

/// Receiving half of the event channel.
pub type EventReceiver = tokio::sync::mpsc::Receiver<ButtonPress>;

/// Create a new event channel with the given capacity.
pub fn event_channel(capacity: usize) -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::channel(capacity.max(1))
}
