//! User-notification seam.
//!
//! The web client popped a toast for surfaced errors; a library delegates
//! that to whatever hosts it. The error pipeline only decides *whether* a
//! message should reach the user, never how it is rendered.

use std::sync::Arc;

/// Receives human-readable error messages that should be shown to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Default notifier: surfaces messages through tracing at warn level.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// The default notifier used when the host does not supply one.
pub fn create_notifier() -> Arc<dyn Notifier> {
    Arc::new(LogNotifier)
}
