//! Generic finite-state workflow engine.
//!
//! A [`WorkflowDefinition`] owns the transition table; [`transition`] is a pure function of
//! `(definition, instance, action, actor)` that either returns the advanced instance with one
//! appended history entry or a [`WorkflowError`]. The engine never stores or publishes
//! anything itself.

mod actor;
mod definition;
mod instance;
mod transition;

pub use actor::{Actor, ActorRole, InstanceId, OrganizationId, Ownership, UserId};
pub use definition::{
    DefinitionError, Guard, TransitionRule, WorkflowAction, WorkflowDefinition, WorkflowState,
};
pub use instance::{ActorStamp, HistoryEntry, WorkflowInstance};
pub use transition::{
    available_actions, transition, transition_at, ForbiddenReason, WorkflowError,
};

#[cfg(test)]
mod tests;
