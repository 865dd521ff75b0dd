//! Current-role resolution: the role of the signed-in user within the
//! currently selected tenant.
//!
//! The resolver consumes session snapshots, fetches the matching
//! membership from the store, and publishes a [`RoleState`] over a watch
//! channel that any number of gates/views may observe.
//!
//! # Invariants
//! - A fetch is issued only when both a user and a tenant are present;
//!   otherwise the state is `Inactive`, never `Loading` or `Ready`.
//! - Latest request wins: each issued fetch carries a per-key generation,
//!   and a completion is applied only if its key is still the active key
//!   and its generation is the latest issued for that key. Anything else
//!   is discarded silently.
//! - Cached results are reused without fetching while fresh; stale entries
//!   are served immediately and revalidated in the background.
//! - A transport failure is retried once, then surfaced as `Failed`.
//!   Failures are never cached and never become `Ready`.
//!
//! All shared state lives behind a mutex that is never held across an
//! await; the model is overlapping fetches on one event loop, not
//! parallelism.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::watch;

use salonkit_auth::{MembershipKey, Role};
use salonkit_core::TenantId;

use crate::cache::{CacheLookup, RoleCache};
use crate::context::SessionSnapshot;
use crate::store::{MembershipStore, StoreError};

/// The resolver's published state for the active `(tenant, user)` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleState {
    /// No signed-in user or no selected tenant; resolution is intentionally
    /// skipped. Distinct from `Loading` so collaborators can tell "not
    /// applicable" apart from "in flight".
    Inactive,
    /// A fetch is in flight and no previous value exists for this key.
    Loading,
    /// The store answered. `role: None` is the affirmative "no membership"
    /// outcome, which fails every minimum-role check.
    Ready { role: Option<Role> },
    /// The fetch failed after the bounded retry.
    Failed,
}

impl RoleState {
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleState::Ready { role } => *role,
            _ => None,
        }
    }
}

/// The `{role, is_loading, is_error}` view consumed by UI collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentRole {
    pub role: Option<Role>,
    pub is_loading: bool,
    pub is_error: bool,
}

impl From<RoleState> for CurrentRole {
    fn from(state: RoleState) -> Self {
        Self {
            role: state.role(),
            is_loading: matches!(state, RoleState::Loading),
            is_error: matches!(state, RoleState::Failed),
        }
    }
}

struct ResolverInner {
    cache: RoleCache,
    active_key: Option<MembershipKey>,
    generations: HashMap<MembershipKey, u64>,
    next_generation: u64,
}

impl ResolverInner {
    /// Issue a new generation for `key`, superseding any fetch in flight
    /// for the same key.
    fn issue_generation(&mut self, key: MembershipKey) -> u64 {
        self.next_generation += 1;
        self.generations.insert(key, self.next_generation);
        self.next_generation
    }
}

struct Shared<S> {
    store: S,
    inner: Mutex<ResolverInner>,
    state_tx: watch::Sender<RoleState>,
}

/// Resolves the current `(tenant, user)` pair to a role, with caching.
///
/// Cloning is cheap and every clone observes the same state; the store is
/// the only collaborator the resolver owns.
pub struct RoleResolver<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for RoleResolver<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S> RoleResolver<S>
where
    S: MembershipStore + 'static,
{
    pub fn new(store: S) -> Self {
        Self::with_cache(store, RoleCache::new())
    }

    /// Resolver over a pre-configured cache (e.g. a shorter freshness
    /// window).
    pub fn with_cache(store: S, cache: RoleCache) -> Self {
        let (state_tx, _) = watch::channel(RoleState::Inactive);
        Self {
            shared: Arc::new(Shared {
                store,
                inner: Mutex::new(ResolverInner {
                    cache,
                    active_key: None,
                    generations: HashMap::new(),
                    next_generation: 0,
                }),
                state_tx,
            }),
        }
    }

    /// Observe state changes. The receiver always carries the latest
    /// published state, starting at `Inactive`.
    pub fn subscribe(&self) -> watch::Receiver<RoleState> {
        self.shared.state_tx.subscribe()
    }

    /// The currently published state.
    pub fn state(&self) -> RoleState {
        *self.shared.state_tx.borrow()
    }

    /// The `{role, is_loading, is_error}` view of the current state.
    pub fn current_role(&self) -> CurrentRole {
        CurrentRole::from(self.state())
    }

    /// Re-evaluate for a new session snapshot.
    ///
    /// Call on every identity or tenant change; [`drive`] does this from a
    /// session channel. Must run inside a tokio runtime: cache misses and
    /// stale entries spawn a background fetch.
    pub fn apply(&self, snapshot: &SessionSnapshot) {
        let Some(key) = snapshot.membership_key() else {
            let mut inner = self.shared.lock_inner();
            inner.active_key = None;
            drop(inner);
            self.shared.state_tx.send_replace(RoleState::Inactive);
            return;
        };

        let now = Utc::now();
        let mut inner = self.shared.lock_inner();
        inner.active_key = Some(key);

        match inner.cache.lookup(&key, now) {
            CacheLookup::Fresh(entry) => {
                drop(inner);
                self.shared
                    .state_tx
                    .send_replace(RoleState::Ready { role: entry.role });
            }
            CacheLookup::Stale(entry) => {
                let generation = inner.issue_generation(key);
                drop(inner);
                // Serve the last known value while revalidating.
                self.shared
                    .state_tx
                    .send_replace(RoleState::Ready { role: entry.role });
                self.spawn_fetch(key, generation);
            }
            CacheLookup::Miss => {
                let generation = inner.issue_generation(key);
                drop(inner);
                self.shared.state_tx.send_replace(RoleState::Loading);
                self.spawn_fetch(key, generation);
            }
        }
    }

    /// Drop the cached entry for `key`; if it is the active key, refetch.
    pub fn invalidate(&self, key: &MembershipKey) {
        let mut inner = self.shared.lock_inner();
        inner.cache.invalidate(key);
        let refetch = (inner.active_key == Some(*key)).then(|| inner.issue_generation(*key));
        drop(inner);

        if let Some(generation) = refetch {
            self.shared.state_tx.send_replace(RoleState::Loading);
            self.spawn_fetch(*key, generation);
        }
    }

    /// Drop every cached entry for a tenant (e.g. after a team-role
    /// change); if the active key belongs to it, refetch.
    pub fn invalidate_tenant(&self, tenant_id: TenantId) {
        let mut inner = self.shared.lock_inner();
        inner.cache.invalidate_tenant(tenant_id);
        let refetch = inner
            .active_key
            .filter(|key| key.tenant_id == tenant_id)
            .map(|key| (key, inner.issue_generation(key)));
        drop(inner);

        if let Some((key, generation)) = refetch {
            self.shared.state_tx.send_replace(RoleState::Loading);
            self.spawn_fetch(key, generation);
        }
    }

    fn spawn_fetch(&self, key: MembershipKey, generation: u64) {
        tracing::debug!(
            tenant_id = %key.tenant_id,
            user_id = %key.user_id,
            generation,
            "issuing membership fetch"
        );
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared.resolve_fetch(key, generation).await;
        });
    }
}

impl<S> Shared<S>
where
    S: MembershipStore,
{
    async fn resolve_fetch(&self, key: MembershipKey, generation: u64) {
        let outcome = self.fetch_with_retry(key).await;

        let mut inner = self.lock_inner();
        if inner.active_key != Some(key) {
            tracing::trace!(
                tenant_id = %key.tenant_id,
                user_id = %key.user_id,
                "discarding fetch result for abandoned key"
            );
            return;
        }
        if inner.generations.get(&key) != Some(&generation) {
            tracing::trace!(
                tenant_id = %key.tenant_id,
                user_id = %key.user_id,
                generation,
                "discarding superseded fetch result"
            );
            return;
        }

        match outcome {
            Ok(role) => {
                inner.cache.insert(key, role, Utc::now());
                drop(inner);
                self.state_tx.send_replace(RoleState::Ready { role });
            }
            Err(error) => {
                drop(inner);
                tracing::warn!(
                    tenant_id = %key.tenant_id,
                    user_id = %key.user_id,
                    %error,
                    "membership fetch failed after retry"
                );
                self.state_tx.send_replace(RoleState::Failed);
            }
        }
    }

    /// One fetch, with at most one transparent retry on a transport fault.
    async fn fetch_with_retry(&self, key: MembershipKey) -> Result<Option<Role>, StoreError> {
        match self.store.fetch_membership(key.tenant_id, key.user_id).await {
            Ok(membership) => Ok(membership.map(|m| m.role)),
            Err(first) => {
                tracing::debug!(
                    tenant_id = %key.tenant_id,
                    user_id = %key.user_id,
                    error = %first,
                    "membership fetch failed, retrying once"
                );
                self.store
                    .fetch_membership(key.tenant_id, key.user_id)
                    .await
                    .map(|membership| membership.map(|m| m.role))
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, ResolverInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bind a resolver to a session channel: applies the current snapshot,
/// then every subsequent change until the controller is dropped.
pub async fn drive<S>(resolver: RoleResolver<S>, mut session: watch::Receiver<SessionSnapshot>)
where
    S: MembershipStore + 'static,
{
    let snapshot = *session.borrow_and_update();
    resolver.apply(&snapshot);

    while session.changed().await.is_ok() {
        let snapshot = *session.borrow_and_update();
        resolver.apply(&snapshot);
    }
}
