//! Membership store boundary.
//!
//! The real store lives behind the platform's backend; this crate only
//! defines the read contract the resolver needs, plus an in-memory
//! implementation for tests/dev.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use async_trait::async_trait;

use salonkit_auth::{Membership, MembershipKey};
use salonkit_core::{TenantId, UserId};

/// Membership store error.
///
/// An absent membership is **not** an error: `fetch_membership` reports it
/// as `Ok(None)`. Errors are reserved for transport faults (network, auth,
/// backend outage).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("membership store transport failure: {0}")]
    Transport(String),
}

impl StoreError {
    /// Wrap an underlying transport fault, keeping its context chain.
    pub fn transport(err: anyhow::Error) -> Self {
        Self::Transport(format!("{err:#}"))
    }
}

/// Read access to tenant memberships.
///
/// Implementations enforce the at-most-one-membership-per-`(tenant, user)`
/// invariant; callers here only read.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Fetch the membership for `(tenant_id, user_id)`.
    ///
    /// `Ok(None)` is the affirmative "no membership" answer and callers
    /// must treat it as a valid outcome, not a fault.
    async fn fetch_membership(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<Membership>, StoreError>;
}

#[async_trait]
impl<S> MembershipStore for Arc<S>
where
    S: MembershipStore + ?Sized,
{
    async fn fetch_membership(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<Membership>, StoreError> {
        (**self).fetch_membership(tenant_id, user_id).await
    }
}

/// In-memory membership store for tests/dev.
///
/// Keying by [`MembershipKey`] makes the one-membership-per-pair invariant
/// structural. Fetches are counted and faults can be injected so caching
/// and retry behavior are observable from tests.
#[derive(Debug, Default)]
pub struct InMemoryMembershipStore {
    memberships: RwLock<HashMap<MembershipKey, Membership>>,
    fetches: AtomicU64,
    faults_to_inject: AtomicU32,
}

impl InMemoryMembershipStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or replace the membership for its `(tenant, user)` pair.
    pub fn upsert(&self, membership: Membership) {
        let mut memberships = self
            .memberships
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        memberships.insert(membership.key(), membership);
    }

    pub fn remove(&self, key: &MembershipKey) {
        let mut memberships = self
            .memberships
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        memberships.remove(key);
    }

    /// Total fetches served (including injected faults).
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make the next `count` fetches fail with a transport error.
    pub fn inject_faults(&self, count: u32) {
        self.faults_to_inject.store(count, Ordering::SeqCst);
    }

    fn take_fault(&self) -> bool {
        self.faults_to_inject
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }
}

#[async_trait]
impl MembershipStore for InMemoryMembershipStore {
    async fn fetch_membership(
        &self,
        tenant_id: TenantId,
        user_id: UserId,
    ) -> Result<Option<Membership>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if self.take_fault() {
            return Err(StoreError::transport(anyhow!(
                "injected membership store outage"
            )));
        }

        let memberships = self
            .memberships
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(memberships
            .get(&MembershipKey::new(tenant_id, user_id))
            .cloned())
    }
}
