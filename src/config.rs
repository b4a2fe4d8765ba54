// MIT License - Copyright (c) 2026 Peter Wright
// Connection configuration

use std::path::PathBuf;

use crate::constants::{DEFAULT_EVENT_CAPACITY, DEFAULT_SOCKET_PATH};
use crate::error::{LircError, Result};
use crate::transport::Endpoint;

/// Configuration for connecting to lircd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Where lircd listens (default: `/var/run/lirc/lircd`)
    pub endpoint: Endpoint,
    /// Button presses buffered before the read loop waits for the consumer
    /// (default: 1)
    pub event_capacity: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Unix(PathBuf::from(DEFAULT_SOCKET_PATH)),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ConnectionConfig {
    /// Create a new config builder starting from defaults.
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(LircError::Config {
                details: "event_capacity must be at least 1".to_string(),
            });
        }
        match &self.endpoint {
            Endpoint::Unix(path) if path.as_os_str().is_empty() => Err(LircError::Config {
                details: "socket path is empty".to_string(),
            }),
            Endpoint::Tcp(host) if host.is_empty() || host.starts_with(':') => {
                Err(LircError::Config {
                    details: format!("invalid lircd host {:?}", host),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Builder for ConnectionConfig.
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.config.endpoint = endpoint;
        self
    }

    pub fn unix(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.endpoint = Endpoint::unix(path);
        self
    }

    pub fn tcp(mut self, host: impl Into<String>) -> Self {
        self.config.endpoint = Endpoint::tcp(host);
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}
