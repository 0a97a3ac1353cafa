//! The application's view of an authenticated session.

use api::identity::{ProviderSession, ProviderUser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub email_confirmed: bool,
}

impl From<&ProviderUser> for SessionUser {
    /// Provider-mapped users always get [`Role::User`].
    fn from(user: &ProviderUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone().unwrap_or_default(),
            name: user.display_name(),
            role: Role::User,
            email_confirmed: user.email_confirmed(),
        }
    }
}

/// Token pair plus the signed-in user. At most one per client context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

impl From<&ProviderSession> for Session {
    fn from(session: &ProviderSession) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            user: SessionUser::from(&session.user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_session() {
        let provider: ProviderSession = serde_json::from_value(serde_json::json!({
            "access_token": "access",
            "refresh_token": "refresh",
            "token_type": "bearer",
            "expires_in": 3600,
            "user": {
                "id": "6f1c2d9e-6a0f-4b8e-9d55-1a2b3c4d5e6f",
                "email": "jan@example.com",
                "email_confirmed_at": "2024-03-01T10:00:00Z",
                "user_metadata": {"name": "Jan"}
            }
        }))
        .unwrap();

        let session = Session::from(&provider);
        assert_eq!(session.refresh_token, "refresh");
        assert_eq!(session.user.name, "Jan");
        assert_eq!(session.user.role, Role::User);
        assert!(session.user.email_confirmed);

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["user"]["emailConfirmed"], true);
        assert_eq!(value["user"]["role"], "user");
    }
}
