//! Access gate: the declarative guard UI collaborators render against.
//!
//! A gate maps the resolver's state and a required minimum role to one of
//! three decisions. Rendering stays with the caller; the gate only picks
//! which content survives. Fail closed: a fetch error or an inactive
//! session never renders the protected content.

use salonkit_auth::{Role, has_minimum_role};

use crate::resolver::RoleState;

/// What a gate decided for the current resolver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The role is still being resolved: render nothing, so the user never
    /// sees a wrong-then-right flicker.
    Pending,
    /// The resolved role satisfies the minimum: render the protected
    /// content.
    Granted,
    /// The resolved role (or its absence, or a fetch error) does not
    /// satisfy the minimum: render the fallback if one exists.
    Denied,
}

/// The gated content after a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gated<T> {
    Nothing,
    Fallback(T),
    Children(T),
}

impl<T> Gated<T> {
    /// The protected content, if it was granted.
    pub fn children(&self) -> Option<&T> {
        match self {
            Gated::Children(children) => Some(children),
            _ => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Gated::Nothing)
    }
}

/// A minimum-role guard over the resolver's published state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGate {
    min_role: Role,
}

impl AccessGate {
    pub fn new(min_role: Role) -> Self {
        Self { min_role }
    }

    pub fn min_role(&self) -> Role {
        self.min_role
    }

    /// Map resolver state × predicate to a decision.
    ///
    /// `Inactive` denies: with no signed-in user or selected tenant, no
    /// minimum can ever be satisfied, and pending would suppress the
    /// fallback indefinitely.
    pub fn decide(&self, state: &RoleState) -> GateDecision {
        match state {
            RoleState::Loading => GateDecision::Pending,
            RoleState::Ready { role } => {
                if has_minimum_role(*role, self.min_role) {
                    GateDecision::Granted
                } else {
                    GateDecision::Denied
                }
            }
            RoleState::Inactive | RoleState::Failed => GateDecision::Denied,
        }
    }

    /// Choose between the protected children, the fallback, and nothing.
    pub fn render<T>(&self, state: &RoleState, children: T, fallback: Option<T>) -> Gated<T> {
        match self.decide(state) {
            GateDecision::Pending => Gated::Nothing,
            GateDecision::Granted => Gated::Children(children),
            GateDecision::Denied => match fallback {
                Some(fallback) => Gated::Fallback(fallback),
                None => Gated::Nothing,
            },
        }
    }
}
