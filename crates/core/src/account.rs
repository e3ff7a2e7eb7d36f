//! User accounts
//!
//! Credentials are kept and persisted as plain text. Hashing them would
//! change the data file format, so the gap is carried over as-is.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages hives and tasks
    Admin,
    /// Views hives, completes tasks
    Employee,
}

impl Role {
    /// On-disk name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
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
            "admin" => Ok(Role::Admin),
            "employee" => Ok(Role::Employee),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A login account
///
/// Serialized output leaves the password out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Unique, case-sensitive login name
    pub username: String,
    /// Plain-text password
    #[serde(skip_serializing)]
    pub password: String,
    /// Name shown to people
    pub display_name: String,
    /// Access role
    pub role: Role,
}

impl Account {
    /// Create an account
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            display_name: display_name.into(),
            role,
        }
    }

    /// Whether the given credentials match this account exactly
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    /// Whether this account has the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Admin, Role::Employee] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let account = Account::new("pavel", "password123", "Pavel", Role::Admin);
        assert!(account.matches("pavel", "password123"));
        assert!(!account.matches("Pavel", "password123"));
        assert!(!account.matches("pavel", "Password123"));
        assert!(account.is_admin());
    }

    #[test]
    fn test_serialized_account_omits_password() {
        let account = Account::new("pavel", "password123", "Pavel", Role::Admin);
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["username"], "pavel");
        assert_eq!(value["role"], "admin");
        assert!(value.get("password").is_none());
    }
}
