//! Session context: who is signed in, and which tenant is selected.
//!
//! Identity and tenant selection are owned by external collaborators (the
//! auth provider and the tenant switcher). They push changes through the
//! [`SessionController`]; everything downstream observes an explicit
//! [`watch`] channel instead of reading ambient globals, so the resolver
//! reacts to key-change events rather than to a rendering cycle.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use salonkit_auth::MembershipKey;
use salonkit_core::{TenantId, UserId};

/// The session's identity + tenant selection at one point in time.
///
/// Either half may be absent: signed out, or signed in with no tenant
/// chosen yet (a fresh login, or mid tenant-switch). Serializable so the
/// shell can persist the last selection across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user_id: Option<UserId>,
    pub tenant_id: Option<TenantId>,
}

impl SessionSnapshot {
    pub fn new(user_id: Option<UserId>, tenant_id: Option<TenantId>) -> Self {
        Self { user_id, tenant_id }
    }

    /// The membership key for this snapshot, present only when **both**
    /// a user and a tenant are set. This is the resolver's activation
    /// condition: no key, no fetch.
    pub fn membership_key(&self) -> Option<MembershipKey> {
        match (self.tenant_id, self.user_id) {
            (Some(tenant_id), Some(user_id)) => Some(MembershipKey::new(tenant_id, user_id)),
            _ => None,
        }
    }
}

/// Write side of the session channel, handed to the identity/tenant
/// collaborators.
#[derive(Debug)]
pub struct SessionController {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    pub fn sign_in(&self, user_id: UserId) {
        self.tx.send_modify(|snapshot| snapshot.user_id = Some(user_id));
    }

    /// Sign out. Also clears the tenant selection: a selection without an
    /// identity is meaningless and would go stale across accounts.
    pub fn sign_out(&self) {
        self.tx.send_replace(SessionSnapshot::default());
    }

    pub fn select_tenant(&self, tenant_id: TenantId) {
        self.tx
            .send_modify(|snapshot| snapshot.tenant_id = Some(tenant_id));
    }

    pub fn clear_tenant(&self) {
        self.tx.send_modify(|snapshot| snapshot.tenant_id = None);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        *self.tx.borrow()
    }

    /// A fresh observer of session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }
}

/// Create a session channel starting signed out, with no tenant selected.
pub fn session_channel() -> (SessionController, watch::Receiver<SessionSnapshot>) {
    let (tx, rx) = watch::channel(SessionSnapshot::default());
    (SessionController { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_requires_both_halves() {
        let user_id = UserId::new();
        let tenant_id = TenantId::new();

        assert!(SessionSnapshot::default().membership_key().is_none());
        assert!(
            SessionSnapshot::new(Some(user_id), None)
                .membership_key()
                .is_none()
        );
        assert!(
            SessionSnapshot::new(None, Some(tenant_id))
                .membership_key()
                .is_none()
        );

        let key = SessionSnapshot::new(Some(user_id), Some(tenant_id))
            .membership_key()
            .unwrap();
        assert_eq!(key, MembershipKey::new(tenant_id, user_id));
    }

    #[test]
    fn sign_out_clears_the_tenant_selection() {
        let (controller, rx) = session_channel();
        controller.sign_in(UserId::new());
        controller.select_tenant(TenantId::new());
        assert!(controller.snapshot().membership_key().is_some());

        controller.sign_out();
        let snapshot = *rx.borrow();
        assert_eq!(snapshot, SessionSnapshot::default());
    }

    #[test]
    fn snapshot_persists_as_json() {
        let snapshot = SessionSnapshot::new(Some(UserId::new()), Some(TenantId::new()));
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored: SessionSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[tokio::test]
    async fn observers_see_tenant_switches() {
        let (controller, mut rx) = session_channel();
        let tenant_id = TenantId::new();

        controller.select_tenant(tenant_id);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().tenant_id, Some(tenant_id));
    }
}
