//! Session lifecycle signals.
//!
//! The access layer never navigates. When the session changes it notifies
//! the listeners registered through `ApiClient::on_session_event`, and the
//! caller decides what to do (typically: show the login screen on
//! `Expired`).

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A login succeeded and its token was stored.
    LoggedIn,
    /// `logout` ran; the token has been cleared.
    LoggedOut,
    /// The server rejected the stored token with 401; it has been cleared.
    Expired,
}

/// `Anonymous -> Authenticated` only through a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

pub type SessionListener = Arc<dyn Fn(SessionEvent) + Send + Sync>;
