//! Operator notifications.
//!
//! Every remote-call failure is caught where it happens and surfaced through a
//! [`Notifier`] as a short, transient message. The CLI renders them through
//! `tracing`; tests collect them with [`MemoryNotifier`].

use parking_lot::Mutex;

/// Transient operator-facing messages.
pub trait Notifier: Send + Sync {
    /// A long-running action started.
    fn loading(&self, message: &str);
    /// An action completed.
    fn success(&self, message: &str);
    /// An action failed.
    fn error(&self, message: &str);
    /// Clear any pending loading message.
    fn dismiss(&self);
}

/// Renders notifications as log events under the `refund_desk::notify` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn loading(&self, message: &str) {
        tracing::info!(target: "refund_desk::notify", "{message}");
    }

    fn success(&self, message: &str) {
        tracing::info!(target: "refund_desk::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "refund_desk::notify", "{message}");
    }

    fn dismiss(&self) {}
}

/// A recorded notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Loading(String),
    Success(String),
    Error(String),
    Dismiss,
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    entries: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().clone()
    }

    /// Messages of the recorded errors.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                Notification::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Messages of the recorded successes.
    #[must_use]
    pub fn successes(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                Notification::Success(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn loading(&self, message: &str) {
        self.entries.lock().push(Notification::Loading(message.to_owned()));
    }

    fn success(&self, message: &str) {
        self.entries.lock().push(Notification::Success(message.to_owned()));
    }

    fn error(&self, message: &str) {
        self.entries.lock().push(Notification::Error(message.to_owned()));
    }

    fn dismiss(&self) {
        self.entries.lock().push(Notification::Dismiss);
    }
}
