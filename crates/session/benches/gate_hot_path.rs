//! Benchmarks for the synchronous hot path every guarded render hits:
//! cache lookup, minimum-role predicate, gate decision.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use chrono::Utc;
use salonkit_auth::{MembershipKey, Role, has_minimum_role};
use salonkit_core::{TenantId, UserId};
use salonkit_session::{AccessGate, RoleCache, RoleState};

fn bench_gate_hot_path(c: &mut Criterion) {
    let mut cache = RoleCache::new();
    let key = MembershipKey::new(TenantId::new(), UserId::new());
    cache.insert(key, Some(Role::Admin), Utc::now());

    c.bench_function("cache_lookup_fresh", |b| {
        let now = Utc::now();
        b.iter(|| black_box(cache.lookup(black_box(&key), now)));
    });

    c.bench_function("minimum_role_predicate", |b| {
        b.iter(|| black_box(has_minimum_role(black_box(Some(Role::Admin)), Role::Owner)));
    });

    c.bench_function("gate_decide_ready", |b| {
        let gate = AccessGate::new(Role::Admin);
        let state = RoleState::Ready {
            role: Some(Role::Admin),
        };
        b.iter(|| black_box(gate.decide(black_box(&state))));
    });
}

criterion_group!(benches, bench_gate_hot_path);
criterion_main!(benches);
