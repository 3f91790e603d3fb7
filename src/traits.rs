/// Trait for reacting to an unrecoverable session expiry, allowing the
/// redirect-to-login side effect to be injected and tested.
///
/// The browser front end this client replaces forced a full navigation to the
/// login page; for a terminal client the equivalent is telling the user to
/// log in again.
pub trait SessionExpiryHandler: Send + Sync {
    fn on_session_expired(&self);
}

/// Default implementation that logs and prints a re-login prompt.
pub struct LogSessionExpiryHandler;

impl SessionExpiryHandler for LogSessionExpiryHandler {
    fn on_session_expired(&self) {
        tracing::warn!("Session expired, credentials cleared");
        eprintln!("Your session has expired. Please run `cv-desk login` again.");
    }
}
