// MIT License - Copyright (c) 2026 Peter Wright
// Pattern-based dispatch of button presses

use std::future::Future;
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};
use tracing::trace;

use crate::error::{LircError, Result};
use crate::event::{ButtonPress, EventReceiver};

/// Callback invoked for a routed button press.
pub type ButtonHandler = Arc<dyn Fn(&ButtonPress) + Send + Sync>;

#[derive(Clone)]
struct Route {
    remote: String,
    button: String,
    remote_glob: GlobMatcher,
    button_glob: GlobMatcher,
    handler: ButtonHandler,
}

/// Routes button presses to handlers keyed by remote and button patterns.
///
/// Patterns are shell globs (`*`, `?`, `[...]`). A route registered with
/// the exact remote and button names of a press takes it alone; otherwise
/// every route whose two patterns match is called, in registration order.
///
/// ```
/// use lirc_client::EventRouter;
///
/// let router = EventRouter::new()
///     .on("*", "KEY_POWER", |_| println!("power"))?
///     .on("Television", "KEY_*", |press| println!("tv: {}", press.button_name))?;
/// # Ok::<(), lirc_client::LircError>(())
/// ```
#[derive(Clone, Default)]
pub struct EventRouter {
    routes: Vec<Route>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for presses matching `remote` and `button`.
    /// Registering the same pair again replaces the earlier handler.
    pub fn on<F>(mut self, remote: &str, button: &str, handler: F) -> Result<Self>
    where
        F: Fn(&ButtonPress) + Send + Sync + 'static,
    {
        let route = Route {
            remote: remote.to_string(),
            button: button.to_string(),
            remote_glob: compile(remote)?,
            button_glob: compile(button)?,
            handler: Arc::new(handler),
        };

        match self
            .routes
            .iter_mut()
            .find(|r| r.remote == remote && r.button == button)
        {
            Some(existing) => *existing = route,
            None => self.routes.push(route),
        }
        Ok(self)
    }

    /// Call the handlers for one press. Returns how many were called.
    pub fn dispatch(&self, press: &ButtonPress) -> usize {
        if let Some(exact) = self.routes.iter().find(|r| {
            r.remote == press.remote_control_name && r.button == press.button_name
        }) {
            (exact.handler)(press);
            return 1;
        }

        let mut called = 0;
        for route in &self.routes {
            if route.remote_glob.is_match(&press.remote_control_name)
                && route.button_glob.is_match(&press.button_name)
            {
                (route.handler)(press);
                called += 1;
            }
        }
        if called == 0 {
            trace!(
                remote = %press.remote_control_name,
                button = %press.button_name,
                "No handler for button press"
            );
        }
        called
    }

    /// Dispatch presses from `events` until `shutdown` resolves or the
    /// channel closes.
    pub async fn run<F>(&self, events: &mut EventReceiver, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => return,
                press = events.recv() => match press {
                    Some(press) => {
                        self.dispatch(&press);
                    }
                    None => return,
                },
            }
        }
    }
}

fn compile(pattern: &str) -> Result<GlobMatcher> {
    // `*` and `?` stop at `/`, as in a shell.
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| LircError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
