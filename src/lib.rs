// MIT License - Copyright (c) 2026 Peter Wright
// lircd socket client
//
//! # lirc-client
//!
//! Async client for the socket protocol of the LIRC daemon (lircd), over a
//! local stream socket or TCP.
//!
//! One connection carries two kinds of traffic: button presses that lircd
//! broadcasts whenever a remote is used, and `BEGIN`…`END` replies to the
//! commands a client sends. [`Connection`] separates the two: presses are
//! delivered in order on an event channel, and each command sent with
//! [`Connection::send_command`] gets its own reply. Only one command is on
//! the wire at a time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use lirc_client::{Connection, List};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let conn = Arc::new(Connection::unix("/var/run/lirc/lircd"));
//!     let mut events = conn.take_events().expect("first call");
//!
//!     let runner = {
//!         let conn = conn.clone();
//!         tokio::spawn(async move { conn.start().await })
//!     };
//!
//!     let remotes = conn.send_command(&List::default()).await?;
//!     println!("remotes: {:?}", remotes.data);
//!
//!     tokio::spawn(async move {
//!         while let Some(press) = events.recv().await {
//!             println!("{} {}", press.remote_control_name, press.button_name);
//!         }
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!     conn.disconnect();
//!     runner.await??;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod event;
pub mod protocol;
pub mod reader;
pub mod router;
pub(crate) mod shutdown;
pub mod transport;

// Re-exports for convenience
pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use connection::{Connection, Repeating};
pub use error::{LircError, ProtocolError, Result};
pub use event::{ButtonPress, CommandReply, EventReceiver};
pub use protocol::{
    Command, DrvOption, List, Raw, SendOnce, SendStart, SendStop, SetInputLog, SetTransmitters,
    Simulate, Version,
};
pub use reader::{Message, ParserState, ProtocolReader};
pub use router::{ButtonHandler, EventRouter};
pub use transport::Endpoint;
