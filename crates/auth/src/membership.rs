//! Tenant membership: the record binding a user to a tenant with one role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salonkit_core::{MembershipId, TenantId, UserId};

use crate::role::Role;

/// The `(tenant, user)` pair identifying a membership.
///
/// This is also the key under which the session layer caches resolved
/// roles; the required minimum role never participates in keying.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipKey {
    pub tenant_id: TenantId,
    pub user_id: UserId,
}

impl MembershipKey {
    pub fn new(tenant_id: TenantId, user_id: UserId) -> Self {
        Self { tenant_id, user_id }
    }
}

/// One user's role grant within one tenant.
///
/// # Invariants
/// - At most one active membership exists per `(tenant, user)` pair. The
///   membership store enforces this; this crate only reads memberships.
/// - `tenant_id` and `user_id` are immutable after creation; only `role`
///   changes, through the external team-administration flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(tenant_id: TenantId, user_id: UserId, role: Role, at: DateTime<Utc>) -> Self {
        Self {
            id: MembershipId::new(),
            tenant_id,
            user_id,
            role,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn key(&self) -> MembershipKey {
        MembershipKey::new(self.tenant_id, self.user_id)
    }

    /// The membership with a different role, stamped at `at`.
    pub fn with_role(mut self, role: Role, at: DateTime<Utc>) -> Self {
        self.role = role;
        self.updated_at = at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_carries_tenant_and_user() {
        let membership = Membership::new(TenantId::new(), UserId::new(), Role::Staff, Utc::now());
        let key = membership.key();
        assert_eq!(key.tenant_id, membership.tenant_id);
        assert_eq!(key.user_id, membership.user_id);
    }

    #[test]
    fn with_role_touches_updated_at_only() {
        let created = Utc::now();
        let membership = Membership::new(TenantId::new(), UserId::new(), Role::Staff, created);
        let changed = membership.clone().with_role(Role::Admin, created + chrono::Duration::hours(1));

        assert_eq!(changed.role, Role::Admin);
        assert_eq!(changed.created_at, created);
        assert!(changed.updated_at > changed.created_at);
        assert_eq!(changed.id, membership.id);
    }
}
