//! Permission grants from `user_permissions`. One row per granted capability;
//! absence denies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A capability name. Strings outside the known set are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Permission {
    Admin,
    CreateRally,
    Other(String),
}

impl Permission {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::CreateRally => "create_rally",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Self::Admin,
            "create_rally" => Self::CreateRally,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Permission {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        match value {
            Permission::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `get-permissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrant {
    pub permission: Permission,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PermissionGrant {
    pub fn new(permission: impl Into<Permission>) -> Self {
        Self {
            permission: permission.into(),
            created_at: None,
        }
    }
}

/// Whether `grants` contain `permission`.
pub fn has_permission(grants: &[PermissionGrant], permission: &Permission) -> bool {
    grants.iter().any(|grant| &grant.permission == permission)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_names() {
        assert_eq!(Permission::from("create_rally"), Permission::CreateRally);
        assert_eq!(Permission::from("admin"), Permission::Admin);
        assert_eq!(
            Permission::from("judge"),
            Permission::Other("judge".to_string())
        );
        assert_eq!(String::from(Permission::Other("judge".into())), "judge");
    }

    #[test]
    fn test_wire_format() {
        let grants: Vec<PermissionGrant> = serde_json::from_str(
            r#"[{"permission": "create_rally", "createdAt": "2024-03-01T10:00:00Z"},
                {"permission": "timekeeper"}]"#,
        )
        .unwrap();

        assert!(has_permission(&grants, &Permission::CreateRally));
        assert!(!has_permission(&grants, &Permission::Admin));
        assert_eq!(grants[1].permission.as_str(), "timekeeper");
        assert_eq!(grants[1].created_at, None);

        let value = serde_json::to_value(&grants[0]).unwrap();
        assert_eq!(value["permission"], "create_rally");
    }
}
