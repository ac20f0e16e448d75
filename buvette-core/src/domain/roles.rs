use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::CoreError;

/// Operational roles carried in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Responsable buvette: fills timesheets, inventories and checklists.
    #[serde(rename = "RB")]
    Rb,
    /// Operations lead: validates what the responsables submit.
    #[serde(rename = "CHEF_OPS")]
    ChefOps,
    /// Logistics: consumes restock lists.
    #[serde(rename = "LOG")]
    Log,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Rb, Role::ChefOps, Role::Log, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Rb => "RB",
            Role::ChefOps => "CHEF_OPS",
            Role::Log => "LOG",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RB" => Ok(Role::Rb),
            "CHEF_OPS" => Ok(Role::ChefOps),
            "LOG" => Ok(Role::Log),
            "ADMIN" => Ok(Role::Admin),
            other => Err(CoreError::validation(format!("unknown role '{other}'"))),
        }
    }
}

/// True when `held` shares at least one role with `required`.
pub fn has_any_role(held: &[Role], required: &[Role]) -> bool {
    required.iter().any(|role| held.contains(role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("MANAGER".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&[Role::ChefOps, Role::Rb]).unwrap();
        assert_eq!(json, r#"["CHEF_OPS","RB"]"#);
    }

    #[test]
    fn any_role_matches_overlap_only() {
        assert!(has_any_role(&[Role::Rb, Role::Log], &[Role::Log, Role::ChefOps]));
        assert!(!has_any_role(&[Role::Rb], &[Role::Admin, Role::ChefOps]));
        assert!(!has_any_role(&[], &[Role::Admin]));
    }
}
