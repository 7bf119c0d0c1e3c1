//! Participant roles

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two fixed protocol roles
///
/// The validator moves first; the user moves second and, in signing,
/// holds the final signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// First mover
    Validator,
    /// Second mover
    User,
}

impl Role {
    /// Both roles, in protocol order
    pub const ALL: [Role; 2] = [Role::Validator, Role::User];

    /// Parse a role tag
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "validator" => Ok(Role::Validator),
            "user" => Ok(Role::User),
            _ => Err(Error::InvalidRole(tag.to_string())),
        }
    }

    /// Wire tag for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Validator => "validator",
            Role::User => "user",
        }
    }

    /// The counterparty role
    pub fn peer(&self) -> Role {
        match self {
            Role::Validator => Role::User,
            Role::User => Role::Validator,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Role::parse(s)
    }
}

impl TryFrom<String> for Role {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!(Role::parse("validator").unwrap(), Role::Validator);
        assert_eq!(Role::parse("user").unwrap(), Role::User);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for tag in ["", "Validator", "USER", "admin", "user ", "validator:"] {
            assert!(matches!(Role::parse(tag), Err(Error::InvalidRole(_))), "{tag:?}");
        }
    }

    #[test]
    fn test_display_inverts_parse() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_peer() {
        assert_eq!(Role::Validator.peer(), Role::User);
        assert_eq!(Role::User.peer(), Role::Validator);
    }

    #[test]
    fn test_serde_uses_tag() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        let role: Role = serde_json::from_str("\"validator\"").unwrap();
        assert_eq!(role, Role::Validator);
        assert!(serde_json::from_str::<Role>("\"bob\"").is_err());
    }
}
