//! Account projections and authentication payloads.
//!
//! Accounts live in four role-specific tables owned by onboarding; this core
//! reads them and flips their status, nothing more.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;

/// The four account populations, each with its own table and natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
pub enum UserType {
    Admin,
    Agent,
    Client,
    Tenant,
}

impl UserType {
    pub const ALL: [UserType; 4] = [
        UserType::Admin,
        UserType::Agent,
        UserType::Client,
        UserType::Tenant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Agent => "agent",
            UserType::Client => "client",
            UserType::Tenant => "tenant",
        }
    }

    /// Table holding this population.
    pub fn table(&self) -> &'static str {
        match self {
            UserType::Admin => "admins",
            UserType::Agent => "agents",
            UserType::Client => "clients",
            UserType::Tenant => "tenants",
        }
    }

    /// Natural-key column within [`Self::table`].
    pub fn id_column(&self) -> &'static str {
        match self {
            UserType::Admin => "unique_id",
            UserType::Agent => "agent_code",
            UserType::Client => "client_code",
            UserType::Tenant => "tenant_code",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserType::Admin),
            "agent" => Some(UserType::Agent),
            "client" => Some(UserType::Client),
            "tenant" => Some(UserType::Tenant),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UserType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UserType::parse(&s.to_ascii_lowercase()).ok_or_else(|| {
            serde::de::Error::unknown_variant(&s, &["admin", "agent", "client", "tenant"])
        })
    }
}

/// Account activity flag, stored as text and validated at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
}

/// Identifies one account across the four tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    pub user_type: UserType,
    pub user_id: String,
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.user_type, self.user_id)
    }
}

#[derive(Debug, Clone, FromRow)]
/// Uniform projection of a row from any of the account tables.
pub struct Account {
    pub user_type: UserType,
    pub user_id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: Option<String>,
    /// Privilege label: `super_admin`, `admin`, `agent`, `client` or `tenant`.
    pub role: String,
    pub status: AccountStatus,
    /// Separate block marker; blocked accounts cannot log in regardless of
    /// status and are not eligible for self-service reactivation.
    pub is_blocked: bool,
    pub password_hash: String,
    pub secret_answer_hash: String,
}

impl Account {
    pub fn key(&self) -> AccountKey {
        AccountKey {
            user_type: self.user_type,
            user_id: self.user_id.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    /// Email address or phone number.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Account summary returned after a successful login.
pub struct LoginUserData {
    pub user_id: String,
    pub firstname: String,
    pub lastname: String,
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload for logging out; `logout_id` must match the session's own account.
pub struct LogoutRequest {
    pub logout_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_serde_roundtrip() {
        let t: UserType = serde_json::from_str("\"tenant\"").unwrap();
        assert_eq!(t, UserType::Tenant);
        // Tolerate legacy casings on input, emit snake_case.
        let a: UserType = serde_json::from_str("\"Admin\"").unwrap();
        assert_eq!(a, UserType::Admin);
        assert_eq!(serde_json::to_string(&UserType::Agent).unwrap(), "\"agent\"");
        assert!(serde_json::from_str::<UserType>("\"landlord\"").is_err());
    }

    #[test]
    fn user_type_table_dispatch_is_closed() {
        assert_eq!(UserType::Admin.table(), "admins");
        assert_eq!(UserType::Admin.id_column(), "unique_id");
        assert_eq!(UserType::Agent.id_column(), "agent_code");
        assert_eq!(UserType::Client.id_column(), "client_code");
        assert_eq!(UserType::Tenant.id_column(), "tenant_code");
    }

    #[test]
    fn account_key_display() {
        let key = AccountKey {
            user_type: UserType::Agent,
            user_id: "AGT-7".to_string(),
        };
        assert_eq!(key.to_string(), "agent:AGT-7");
    }
}
