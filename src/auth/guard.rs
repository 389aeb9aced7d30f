use crate::model::{role::Role, session::Session};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauth";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectLogin,
    RedirectUnauthorized,
}

impl GuardDecision {
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectLogin => Some(LOGIN_PATH),
            GuardDecision::RedirectUnauthorized => Some(UNAUTHORIZED_PATH),
        }
    }
}

/// Decides whether `session` may enter a subtree restricted to `required`.
/// An empty `required` list admits any signed-in role.
pub fn guard(session: Option<&Session>, required: &[Role]) -> GuardDecision {
    match session {
        Some(s) if !s.token.is_empty() => {
            if required.is_empty() || required.contains(&s.role) {
                GuardDecision::Allow
            } else {
                GuardDecision::RedirectUnauthorized
            }
        }
        _ => GuardDecision::RedirectLogin,
    }
}

/// Login and register are only for signed-out visitors; everyone else is
/// sent to their own dashboard.
pub fn guest_only(session: Option<&Session>) -> Option<&'static str> {
    session
        .filter(|s| !s.token.is_empty())
        .map(|s| s.role.dashboard_path())
}
