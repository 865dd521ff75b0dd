//! Team-administration policy: who may grant, change, and revoke roles.
//!
//! These are **decision** functions only. The mutation itself (invites,
//! role changes, removals) lives in the external membership store; keeping
//! the checks here keeps them testable without any storage in play.
//!
//! # Rules
//! - Managing team members at all requires at least `admin`.
//! - An actor may grant or revoke only roles strictly below their own rank.
//!   Owners are the exception: they manage every role, including `owner`.
//! - The last owner of a tenant may not be demoted or removed.

use crate::authorize::{AuthzError, require_minimum_role};
use crate::role::Role;

/// Can this actor manage team members at all?
pub fn can_manage_team(actor: Role) -> bool {
    require_minimum_role(Some(actor), Role::Admin).is_ok()
}

/// May `actor` grant `granted` to a new member?
pub fn authorize_role_grant(actor: Role, granted: Role) -> Result<(), AuthzError> {
    require_minimum_role(Some(actor), Role::Admin)?;
    ensure_manageable(actor, granted)
}

/// May `actor` change an existing member from `current` to `new_role`?
///
/// `tenant_owner_count` is the number of owners the tenant currently has,
/// counting the member being changed.
pub fn authorize_role_change(
    actor: Role,
    current: Role,
    new_role: Role,
    tenant_owner_count: usize,
) -> Result<(), AuthzError> {
    require_minimum_role(Some(actor), Role::Admin)?;
    ensure_manageable(actor, current)?;
    ensure_manageable(actor, new_role)?;

    if current == Role::Owner && new_role != Role::Owner && tenant_owner_count <= 1 {
        return Err(AuthzError::LastOwner);
    }

    Ok(())
}

/// May `actor` remove a member currently holding `member_role`?
pub fn authorize_member_removal(
    actor: Role,
    member_role: Role,
    tenant_owner_count: usize,
) -> Result<(), AuthzError> {
    require_minimum_role(Some(actor), Role::Admin)?;
    ensure_manageable(actor, member_role)?;

    if member_role == Role::Owner && tenant_owner_count <= 1 {
        return Err(AuthzError::LastOwner);
    }

    Ok(())
}

fn ensure_manageable(actor: Role, target: Role) -> Result<(), AuthzError> {
    if actor == Role::Owner || target.rank() < actor.rank() {
        Ok(())
    } else {
        Err(AuthzError::EscalationBlocked { actor, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_cannot_manage_the_team() {
        assert!(!can_manage_team(Role::Staff));
        assert!(matches!(
            authorize_role_grant(Role::Staff, Role::Staff),
            Err(AuthzError::MissingRole { .. })
        ));
    }

    #[test]
    fn admin_grants_staff_but_not_admin_or_owner() {
        assert!(authorize_role_grant(Role::Admin, Role::Staff).is_ok());
        assert!(matches!(
            authorize_role_grant(Role::Admin, Role::Admin),
            Err(AuthzError::EscalationBlocked { .. })
        ));
        assert!(matches!(
            authorize_role_grant(Role::Admin, Role::Owner),
            Err(AuthzError::EscalationBlocked { .. })
        ));
    }

    #[test]
    fn owner_grants_any_role() {
        for granted in Role::ALL {
            assert!(authorize_role_grant(Role::Owner, granted).is_ok());
        }
    }

    #[test]
    fn admin_cannot_touch_an_owner() {
        assert!(matches!(
            authorize_role_change(Role::Admin, Role::Owner, Role::Staff, 2),
            Err(AuthzError::EscalationBlocked { .. })
        ));
        assert!(matches!(
            authorize_member_removal(Role::Admin, Role::Owner, 2),
            Err(AuthzError::EscalationBlocked { .. })
        ));
    }

    #[test]
    fn owner_promotes_staff_to_owner() {
        assert!(authorize_role_change(Role::Owner, Role::Staff, Role::Owner, 1).is_ok());
    }

    #[test]
    fn last_owner_cannot_be_demoted() {
        assert_eq!(
            authorize_role_change(Role::Owner, Role::Owner, Role::Admin, 1),
            Err(AuthzError::LastOwner)
        );
        // With a second owner in place the demotion goes through.
        assert!(authorize_role_change(Role::Owner, Role::Owner, Role::Admin, 2).is_ok());
    }

    #[test]
    fn last_owner_cannot_be_removed() {
        assert_eq!(
            authorize_member_removal(Role::Owner, Role::Owner, 1),
            Err(AuthzError::LastOwner)
        );
        assert!(authorize_member_removal(Role::Owner, Role::Owner, 2).is_ok());
    }

    #[test]
    fn keeping_an_owner_an_owner_is_not_a_demotion() {
        assert!(authorize_role_change(Role::Owner, Role::Owner, Role::Owner, 1).is_ok());
    }
}
