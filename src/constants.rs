// MIT License - Copyright (c) 2026 Peter Wright
// lircd socket protocol constants

use std::time::Duration;

/// Opens a reply transaction.
pub const BEGIN: &str = "BEGIN";
/// Closes a reply transaction.
pub const END: &str = "END";
pub const SUCCESS: &str = "SUCCESS";
pub const ERROR: &str = "ERROR";
/// Announces the data length line of a reply payload.
pub const DATA: &str = "DATA";

/// Command name of the asynchronous block lircd emits after reloading its
/// configuration. It is never a reply to anything we sent.
pub const RELOAD_NOTIFICATION: &str = "SIGHUP";

/// Number of hex digits in the code field of a broadcast line.
pub const CODE_HEX_DIGITS: usize = 16;
/// Number of bytes the code field decodes to.
pub const CODE_BYTES: usize = CODE_HEX_DIGITS / 2;

/// Ceiling on the wait for a command reply, counted from submission.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest line accepted from lircd before the stream is considered broken.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Default lircd socket path.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/lirc/lircd";
/// Default lircd TCP port (`lircd --listen`).
pub const DEFAULT_TCP_PORT: u16 = 8765;

/// Default event channel capacity. One slot keeps the handoff as close to
/// blocking as a bounded tokio channel allows.
pub const DEFAULT_EVENT_CAPACITY: usize = 1;
