use std::time::Instant;

use log::{info, warn};

use crate::backend::{self, ActionReply, BackendError, LoginReply, SessionStatus};
use crate::model::Session;

use super::{AlbumTab, AppState, AuthTab, NoticeKind, View, WorkflowError};

const BACKEND_UNREACHABLE: &str = "Could not connect to the backend server.";
const NETWORK_RETRY: &str = "Network error. Please try again.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Owns the authenticated identity. Local state is authoritative for
/// leaving a session; the service is authoritative for entering one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionManager;

impl SessionManager {
    pub(crate) fn finish_check(
        state: &mut AppState,
        result: backend::Result<SessionStatus>,
        now: Instant,
    ) {
        match result {
            Ok(status) => {
                let identity = status
                    .username
                    .filter(|name| status.is_logged_in && !name.trim().is_empty());
                match identity {
                    Some(name) => {
                        info!("resumed session for {name}");
                        state.session = Session::signed_in(name);
                        state.view = View::Album(AlbumTab::Upload);
                    }
                    None => state.view = View::Auth(AuthTab::Login),
                }
            }
            Err(error) => {
                warn!("session check failed: {error}");
                state.session.clear();
                state.view = View::Auth(AuthTab::Login);
                state
                    .notifications
                    .post(NoticeKind::Error, BACKEND_UNREACHABLE, now);
            }
        }
    }

    pub(crate) fn finish_login(
        state: &mut AppState,
        username: String,
        result: backend::Result<LoginReply>,
        now: Instant,
    ) {
        let failure = match result {
            Ok(reply) if reply.success => {
                let identity = reply
                    .username
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(username);
                info!("signed in as {identity}");
                state.session = Session::signed_in(identity);
                state.view = View::Album(AlbumTab::Upload);
                state.login_form.clear();
                state
                    .notifications
                    .post(NoticeKind::Success, "Logged in successfully!", now);
                return;
            }
            Ok(reply) => WorkflowError::semantic(reply.message.as_deref(), "Login failed"),
            Err(error) => WorkflowError::from_backend(&error, "Login failed", NETWORK_RETRY),
        };
        state.session.clear();
        state
            .notifications
            .post(NoticeKind::Error, failure.to_string(), now);
    }

    /// Registration never signs in.
    pub(crate) fn finish_register(
        state: &mut AppState,
        result: backend::Result<ActionReply>,
        now: Instant,
    ) {
        let failure = match result {
            Ok(reply) if reply.success => {
                state.register_form.clear();
                state.view = View::Auth(AuthTab::Login);
                state.notifications.post(
                    NoticeKind::Success,
                    "Registration successful! Please login.",
                    now,
                );
                return;
            }
            Ok(reply) => WorkflowError::semantic(reply.best_message(), "Registration failed"),
            Err(error) => WorkflowError::from_backend(&error, "Registration failed", NETWORK_RETRY),
        };
        state
            .notifications
            .post(NoticeKind::Error, failure.to_string(), now);
    }

    /// Drops every piece of per-identity state.
    pub(crate) fn sign_out(state: &mut AppState) {
        if let Some(identity) = state.session.identity() {
            info!("signing out {identity}");
        }
        state.session.clear();
        state.results.clear();
        state.last_search = None;
        state.stats = None;
        state.upload.reset();
        state.modal.force_close();
        state.view = View::Auth(AuthTab::Login);
    }

    pub(crate) fn finish_logout(state: &mut AppState, result: backend::Result<()>, now: Instant) {
        if let Err(error) = result {
            warn!("logout request failed, local session already cleared: {error}");
        }
        state
            .notifications
            .post(NoticeKind::Info, "Logged out successfully", now);
    }

    /// A protected call came back 401.
    pub(crate) fn expire(state: &mut AppState, error: &BackendError, now: Instant) {
        let message = error
            .server_message()
            .unwrap_or(SESSION_EXPIRED)
            .to_string();
        Self::sign_out(state);
        state.notifications.post(NoticeKind::Error, message, now);
    }
}
