//! Observer lists for advisory signals
//!
//! The core never renders anything. It reports outcomes such as a full
//! store or a failed save to whichever handlers the embedding layer has
//! registered.

use std::fmt;

type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Registered handlers for one kind of signal
pub struct Observers<T> {
    handlers: Vec<Handler<T>>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler. Handlers run in registration order.
    pub fn subscribe(&mut self, handler: impl Fn(&T) + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Deliver `signal` to every handler
    pub fn emit(&self, signal: &T) {
        for handler in &self.handlers {
            handler(signal);
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
