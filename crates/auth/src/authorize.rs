//! Minimum-role authorization checks.
//!
//! These are pure policy checks at the boundary between the resolved role
//! and whatever the caller is guarding:
//!
//! - No IO
//! - No panics
//! - No business logic

use thiserror::Error;

use crate::role::Role;

/// Authorization failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The actor's role (or lack of one) does not satisfy the required minimum.
    #[error("forbidden: requires at least '{required}' (actual: {})", fmt_actual(.actual))]
    MissingRole {
        required: Role,
        actual: Option<Role>,
    },

    /// The actor may not grant, change, or revoke the target role.
    #[error("forbidden: '{actor}' may not manage the '{target}' role")]
    EscalationBlocked { actor: Role, target: Role },

    /// The operation would leave the tenant without an owner.
    #[error("cannot demote or remove the last owner of a tenant")]
    LastOwner,
}

fn fmt_actual(actual: &Option<Role>) -> &'static str {
    match actual {
        Some(role) => role.as_str(),
        None => "no membership",
    }
}

/// Does `actual` satisfy a minimum-role requirement?
///
/// `None` means "no membership / role not known" and fails every minimum,
/// including the lowest. The comparison is inclusive: a role satisfies
/// itself, and a higher rank satisfies every lower minimum.
pub fn has_minimum_role(actual: Option<Role>, min: Role) -> bool {
    match actual {
        Some(role) => role.rank() >= min.rank(),
        None => false,
    }
}

/// [`has_minimum_role`] for call sites that propagate with `?`.
pub fn require_minimum_role(actual: Option<Role>, min: Role) -> Result<(), AuthzError> {
    if has_minimum_role(actual, min) {
        Ok(())
    } else {
        Err(AuthzError::MissingRole {
            required: min,
            actual,
        })
    }
}
