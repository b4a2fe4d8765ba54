// MIT License - Copyright (c) 2026 Peter Wright
// Connection-wide shutdown signal

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::LircError;

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Running,
    Stopped(Option<LircError>),
}

/// Shared "connection is shutting down, and why".
///
/// Clones observe the same signal. The first call to [`Shutdown::cancel`] or
/// [`Shutdown::fail`] decides the cause; later calls are ignored.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<State>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(State::Running);
        Self { tx: Arc::new(tx) }
    }

    /// Stop without a failure cause.
    pub fn cancel(&self) {
        self.stop(None);
    }

    /// Stop with `cause` as the terminal error.
    pub fn fail(&self, cause: LircError) {
        self.stop(Some(cause));
    }

    fn stop(&self, cause: Option<LircError>) {
        self.tx.send_if_modified(|state| match state {
            State::Running => {
                *state = State::Stopped(cause);
                true
            }
            State::Stopped(_) => false,
        });
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(*self.tx.borrow(), State::Stopped(_))
    }

    /// The terminal error, if the shutdown was caused by one.
    pub fn cause(&self) -> Option<LircError> {
        match &*self.tx.borrow() {
            State::Stopped(cause) => cause.clone(),
            State::Running => None,
        }
    }

    /// Resolves once shutdown has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| matches!(state, State::Stopped(_))).await;
    }
}
