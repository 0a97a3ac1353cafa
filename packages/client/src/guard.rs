//! Route guards. Pure decisions over an [`AuthState`] snapshot; the view
//! layer maps them to redirects and interstitials.

use crate::state::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Restore still running; render nothing rather than redirect early.
    Pending,
    RedirectToLogin,
    /// Signed in with an unconfirmed email.
    VerifyEmail,
    Granted,
}

impl RouteAccess {
    pub fn for_private_route(state: &AuthState) -> Self {
        if !state.initialized {
            return Self::Pending;
        }
        match &state.session {
            None => Self::RedirectToLogin,
            Some(session) if !session.user.email_confirmed => Self::VerifyEmail,
            Some(_) => Self::Granted,
        }
    }
}

pub const CREATE_RALLY_FORBIDDEN: &str = "You do not have permission to create rallies";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRallyAccess {
    Loading,
    Allowed,
    Forbidden(String),
}

impl CreateRallyAccess {
    /// `None` while the permission query is in flight.
    pub fn from_permission(allowed: Option<bool>) -> Self {
        match allowed {
            None => Self::Loading,
            Some(true) => Self::Allowed,
            Some(false) => Self::Forbidden(CREATE_RALLY_FORBIDDEN.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, Session, SessionUser};
    use uuid::Uuid;

    fn signed_in(email_confirmed: bool) -> AuthState {
        AuthState {
            session: Some(Session {
                access_token: "a".into(),
                refresh_token: "r".into(),
                user: SessionUser {
                    id: Uuid::new_v4(),
                    email: "jan@example.com".into(),
                    name: "Jan".into(),
                    role: Role::User,
                    email_confirmed,
                },
            }),
            initialized: true,
            ..AuthState::default()
        }
    }

    #[test]
    fn test_private_route() {
        assert_eq!(
            RouteAccess::for_private_route(&AuthState::default()),
            RouteAccess::Pending
        );
        let anonymous = AuthState {
            initialized: true,
            ..AuthState::default()
        };
        assert_eq!(
            RouteAccess::for_private_route(&anonymous),
            RouteAccess::RedirectToLogin
        );
        assert_eq!(
            RouteAccess::for_private_route(&signed_in(false)),
            RouteAccess::VerifyEmail
        );
        assert_eq!(
            RouteAccess::for_private_route(&signed_in(true)),
            RouteAccess::Granted
        );
    }

    #[test]
    fn test_create_rally_access() {
        assert_eq!(CreateRallyAccess::from_permission(None), CreateRallyAccess::Loading);
        assert_eq!(CreateRallyAccess::from_permission(Some(true)), CreateRallyAccess::Allowed);
        assert!(matches!(
            CreateRallyAccess::from_permission(Some(false)),
            CreateRallyAccess::Forbidden(_)
        ));
    }
}
