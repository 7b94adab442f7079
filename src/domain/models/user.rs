use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Professional,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Professional => "professional",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "professional" => Ok(Role::Professional),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    #[serde(skip_serializing)]
    pub verification_code: Option<String>,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email: email.trim().to_lowercase(),
            password_hash,
            role: role.as_str().to_string(),
            is_verified: false,
            verification_code: None,
            is_banned: false,
            ban_reason: None,
            phone: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    /// Unknown role strings in storage are treated as the least privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Client)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn is_professional(&self) -> bool {
        self.role() == Role::Professional
    }

    /// Self-access or admin override.
    pub fn can_manage(&self, user_id: &str) -> bool {
        self.id == user_id || self.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_normalizes_email() {
        let user = User::new("Ana".into(), "  Ana@Example.COM ".into(), "hash".into(), Role::Client);
        assert_eq!(user.email, "ana@example.com");
        assert!(!user.is_verified);
        assert!(!user.is_banned);
        assert_eq!(user.role(), Role::Client);
    }

    #[test]
    fn test_role_round_trip_and_fallback() {
        assert_eq!("professional".parse::<Role>().unwrap(), Role::Professional);
        assert!("superuser".parse::<Role>().is_err());

        let mut user = User::new("X".into(), "x@x.com".into(), "h".into(), Role::Admin);
        assert!(user.is_admin());
        user.role = "garbage".into();
        assert_eq!(user.role(), Role::Client);
    }

    #[test]
    fn test_can_manage() {
        let admin = User::new("A".into(), "a@a.com".into(), "h".into(), Role::Admin);
        let client = User::new("C".into(), "c@c.com".into(), "h".into(), Role::Client);
        assert!(admin.can_manage(&client.id));
        assert!(client.can_manage(&client.id));
        assert!(!client.can_manage(&admin.id));
    }
}
