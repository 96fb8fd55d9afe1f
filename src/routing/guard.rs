use super::{Navigator, RETURN_URL_PARAM, ROUTE_HOME, ROUTE_LOGIN, is_public_only};
use crate::services::notification_service::NotificationCenter;
use crate::services::session_state::SessionState;
use std::sync::Arc;

/// Outcome of a pre-navigation check. A redirect denies the original
/// navigation and names where to go instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect { to: String, query: Vec<(String, String)> },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    fn redirect(to: &str) -> Self {
        Self::Redirect { to: to.to_string(), query: Vec::new() }
    }
}

/// Synchronous gate evaluated before each navigation.
///
/// Authenticated users are kept off the login/signup pages; everyone else
/// is kept off everything but those, carrying the denied target along as
/// a return URL.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    state: SessionState,
    notifications: Arc<NotificationCenter>,
}

impl RouteGuard {
    pub fn new(state: SessionState, notifications: Arc<NotificationCenter>) -> Self {
        Self { state, notifications }
    }

    pub fn check(&self, target: &str) -> GuardDecision {
        if self.state.is_authenticated() {
            if is_public_only(target) {
                return GuardDecision::redirect(ROUTE_HOME);
            }
            return GuardDecision::Allow;
        }

        if is_public_only(target) {
            return GuardDecision::Allow;
        }

        self.notifications.show_error("Please log in to access this page", None);
        GuardDecision::Redirect {
            to: ROUTE_LOGIN.to_string(),
            query: vec![(RETURN_URL_PARAM.to_string(), target.to_string())],
        }
    }

    /// Companion check for the login page itself: an already-authenticated
    /// user is sent home before the page loads.
    pub fn resolve_login(&self) -> GuardDecision {
        if self.state.is_authenticated() {
            GuardDecision::redirect(ROUTE_HOME)
        } else {
            GuardDecision::Allow
        }
    }

    /// Runs the check and applies any redirect through the navigator.
    /// Returns whether the original navigation may proceed.
    pub fn enforce(&self, navigator: &dyn Navigator, target: &str) -> bool {
        match self.check(target) {
            GuardDecision::Allow => true,
            GuardDecision::Redirect { to, query } => {
                let pairs: Vec<(&str, &str)> =
                    query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
                navigator.navigate(&to, &pairs);
                false
            }
        }
    }
}
