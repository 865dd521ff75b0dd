//! Role hierarchy for tenant memberships.
//!
//! A member holds exactly one role within a tenant, drawn from a fixed
//! ladder: `staff < admin < owner`. The ladder is the single source of
//! truth for relative privilege; there is no runtime mutation path.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use salonkit_core::DomainError;

/// A member's role within a tenant, ordered by ascending privilege.
///
/// The derived `Ord` agrees with [`Role::rank`]; both exist so call sites
/// can pick whichever reads better (`actual >= min` vs explicit ranks).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Works the calendar: sees own appointments and assigned clients.
    Staff,
    /// Manages the salon day-to-day: clients, services, team scheduling.
    Admin,
    /// Full control of the tenant, including billing and team roles.
    Owner,
}

impl Role {
    /// All roles in ascending privilege order.
    pub const ALL: [Role; 3] = [Role::Staff, Role::Admin, Role::Owner];

    /// Strictly increasing privilege rank: `staff -> 1, admin -> 2, owner -> 3`.
    pub fn rank(self) -> u8 {
        match self {
            Role::Staff => 1,
            Role::Admin => 2,
            Role::Owner => 3,
        }
    }

    /// The stored/wire token for this role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Admin => "admin",
            Role::Owner => "owner",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "owner" => Ok(Role::Owner),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_are_strictly_increasing() {
        assert_eq!(Role::Staff.rank(), 1);
        assert_eq!(Role::Admin.rank(), 2);
        assert_eq!(Role::Owner.rank(), 3);
    }

    #[test]
    fn derived_order_agrees_with_rank() {
        assert!(Role::Staff < Role::Admin);
        assert!(Role::Admin < Role::Owner);
        for a in Role::ALL {
            for b in Role::ALL {
                assert_eq!(a.cmp(&b), a.rank().cmp(&b.rank()));
            }
        }
    }

    #[test]
    fn tokens_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!(" Owner ".parse::<Role>().unwrap(), Role::Owner);
    }

    #[test]
    fn unknown_token_is_rejected() {
        assert!("manager".parse::<Role>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_tokens() {
        assert_eq!(serde_json::to_string(&Role::Owner).unwrap(), "\"owner\"");
        let parsed: Role = serde_json::from_str("\"staff\"").unwrap();
        assert_eq!(parsed, Role::Staff);
    }
}
