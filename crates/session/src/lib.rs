//! `salonkit-session` — tenant-scoped session state and role resolution.
//!
//! This crate wires the pure checks in `salonkit-auth` to the running
//! application: it tracks which user is signed in and which tenant is
//! selected, resolves that pair to a role through the membership store
//! (with caching and latest-request-wins race suppression), and exposes
//! the access gate that UI collaborators render against.
//!
//! Flow: an identity provider and a tenant selector write a
//! [`SessionSnapshot`] through the [`SessionController`]; [`drive`] feeds
//! each change into the [`RoleResolver`]; any number of [`AccessGate`]s
//! read the published [`RoleState`] and decide what to render.

pub mod cache;
pub mod context;
pub mod gate;
pub mod resolver;
pub mod store;

pub use cache::{CacheLookup, RoleCache};
pub use context::{SessionController, SessionSnapshot, session_channel};
pub use gate::{AccessGate, GateDecision, Gated};
pub use resolver::{CurrentRole, RoleResolver, RoleState, drive};
pub use store::{InMemoryMembershipStore, MembershipStore, StoreError};
