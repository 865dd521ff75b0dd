//! Resolved-role cache with a bounded freshness window.
//!
//! The cache is an explicit map from [`MembershipKey`] to the role the
//! store last reported (including the affirmative "no membership"), tagged
//! with its fetch time. Freshness checks take `now` as a parameter so the
//! policy is deterministic under test.
//!
//! Written only by the resolver; readers observe the resolver's published
//! state rather than the cache itself.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use salonkit_auth::{MembershipKey, Role};
use salonkit_core::TenantId;

/// A cached resolution: the role the store reported (`None` = no
/// membership) and when it was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub role: Option<Role>,
    pub fetched_at: DateTime<Utc>,
}

/// Outcome of a cache lookup at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Present and within the freshness window: reuse without fetching.
    Fresh(CacheEntry),
    /// Present but past the window: serve, but revalidate in the background.
    Stale(CacheEntry),
    /// Nothing cached for this key.
    Miss,
}

/// Role cache keyed by `(tenant, user)`.
#[derive(Debug)]
pub struct RoleCache {
    entries: HashMap<MembershipKey, CacheEntry>,
    freshness: Duration,
}

impl RoleCache {
    /// Cache with the standard 5-minute freshness window.
    pub fn new() -> Self {
        Self::with_freshness(Duration::minutes(5))
    }

    pub fn with_freshness(freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            freshness,
        }
    }

    /// Classify the entry for `key` as of `now`.
    pub fn lookup(&self, key: &MembershipKey, now: DateTime<Utc>) -> CacheLookup {
        match self.entries.get(key) {
            Some(entry) if now.signed_duration_since(entry.fetched_at) < self.freshness => {
                CacheLookup::Fresh(*entry)
            }
            Some(entry) => CacheLookup::Stale(*entry),
            None => CacheLookup::Miss,
        }
    }

    /// Record a resolution fetched at `fetched_at`.
    pub fn insert(&mut self, key: MembershipKey, role: Option<Role>, fetched_at: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { role, fetched_at });
    }

    pub fn invalidate(&mut self, key: &MembershipKey) {
        self.entries.remove(key);
    }

    /// Drop every entry for a tenant (e.g. after a team-role change).
    pub fn invalidate_tenant(&mut self, tenant_id: TenantId) {
        self.entries.retain(|key, _| key.tenant_id != tenant_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RoleCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salonkit_core::UserId;

    fn key() -> MembershipKey {
        MembershipKey::new(TenantId::new(), UserId::new())
    }

    #[test]
    fn lookup_misses_on_empty_cache() {
        let cache = RoleCache::new();
        assert_eq!(cache.lookup(&key(), Utc::now()), CacheLookup::Miss);
    }

    #[test]
    fn entries_are_fresh_inside_the_window() {
        let mut cache = RoleCache::new();
        let key = key();
        let fetched_at = Utc::now();
        cache.insert(key, Some(Role::Admin), fetched_at);

        let just_before = fetched_at + Duration::minutes(5) - Duration::seconds(1);
        match cache.lookup(&key, just_before) {
            CacheLookup::Fresh(entry) => assert_eq!(entry.role, Some(Role::Admin)),
            other => panic!("expected fresh entry, got {other:?}"),
        }
    }

    #[test]
    fn entries_go_stale_at_the_window_boundary() {
        let mut cache = RoleCache::new();
        let key = key();
        let fetched_at = Utc::now();
        cache.insert(key, Some(Role::Staff), fetched_at);

        let at_boundary = fetched_at + Duration::minutes(5);
        match cache.lookup(&key, at_boundary) {
            CacheLookup::Stale(entry) => assert_eq!(entry.role, Some(Role::Staff)),
            other => panic!("expected stale entry, got {other:?}"),
        }
    }

    #[test]
    fn no_membership_is_cacheable() {
        let mut cache = RoleCache::new();
        let key = key();
        cache.insert(key, None, Utc::now());

        match cache.lookup(&key, Utc::now()) {
            CacheLookup::Fresh(entry) => assert_eq!(entry.role, None),
            other => panic!("expected fresh entry, got {other:?}"),
        }
    }

    #[test]
    fn invalidate_tenant_spares_other_tenants() {
        let mut cache = RoleCache::new();
        let tenant_a = TenantId::new();
        let tenant_b = TenantId::new();
        let key_a = MembershipKey::new(tenant_a, UserId::new());
        let key_b = MembershipKey::new(tenant_b, UserId::new());
        let now = Utc::now();

        cache.insert(key_a, Some(Role::Owner), now);
        cache.insert(key_b, Some(Role::Staff), now);

        cache.invalidate_tenant(tenant_a);

        assert_eq!(cache.lookup(&key_a, now), CacheLookup::Miss);
        assert!(matches!(cache.lookup(&key_b, now), CacheLookup::Fresh(_)));
    }

    #[test]
    fn freshness_window_is_configurable() {
        let mut cache = RoleCache::with_freshness(Duration::seconds(30));
        let key = key();
        let fetched_at = Utc::now();
        cache.insert(key, Some(Role::Admin), fetched_at);

        assert!(matches!(
            cache.lookup(&key, fetched_at + Duration::seconds(29)),
            CacheLookup::Fresh(_)
        ));
        assert!(matches!(
            cache.lookup(&key, fetched_at + Duration::seconds(31)),
            CacheLookup::Stale(_)
        ));
    }
}
