use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    #[default]
    Collaborator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Collaborator => "COLLABORATOR",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid role '{0}'. Expected 'admin' or 'collaborator'")]
pub struct RoleParseError(String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "collaborator" => Ok(Role::Collaborator),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// UUID to identify the user
    pub id: Uuid,
    /// Display name of the user
    pub name: String,
    /// Email address, doubles as the login identifier
    pub email: String,
    /// Contact phone number
    pub phone: String,
    /// Role of the user within the team
    pub role: Role,
    /// Plaintext password, absent until issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_screaming_snake_case() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"COLLABORATOR\"").unwrap();
        assert_eq!(role, Role::Collaborator);
    }

    #[test]
    fn role_parses_from_cli_spelling() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Collaborator".parse::<Role>().unwrap(), Role::Collaborator);
        assert!("manager".parse::<Role>().is_err());
    }
}
