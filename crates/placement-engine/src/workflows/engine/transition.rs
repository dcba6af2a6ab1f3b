use super::actor::{Actor, ActorRole, InstanceId};
use super::definition::{TransitionRule, WorkflowAction, WorkflowDefinition, WorkflowState};
use super::instance::{normalize_note, ActorStamp, HistoryEntry, WorkflowInstance};
use crate::error::ErrorKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Why an existing edge refused the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenReason {
    RoleNotPermitted,
    OrganizationMismatch,
    NotOwningApplicant,
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenReason::RoleNotPermitted => f.write_str("role not permitted"),
            ForbiddenReason::OrganizationMismatch => {
                f.write_str("actor organization does not own the entity")
            }
            ForbiddenReason::NotOwningApplicant => f.write_str("actor is not the applicant"),
        }
    }
}

/// Failures of a single transition request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("no `{action}` transition from `{state}`")]
    IllegalTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("instance is already `{state}`")]
    NoOpTransition { state: &'static str },
    #[error("{role} may not `{action}` from `{state}`: {reason}")]
    Forbidden {
        role: ActorRole,
        state: &'static str,
        action: &'static str,
        reason: ForbiddenReason,
    },
    #[error("instance `{id}` changed since it was read (expected {expected}, found {found})")]
    ConflictingState {
        id: InstanceId,
        expected: u64,
        found: u64,
    },
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::IllegalTransition { .. } => ErrorKind::IllegalTransition,
            WorkflowError::NoOpTransition { .. } => ErrorKind::NoOpTransition,
            WorkflowError::Forbidden { .. } => ErrorKind::Forbidden,
            WorkflowError::ConflictingState { .. } => ErrorKind::ConflictingState,
        }
    }
}

/// Apply `action` to `instance`, stamping the history entry with the current time.
pub fn transition<S, A>(
    definition: &WorkflowDefinition<S, A>,
    instance: &WorkflowInstance<S>,
    action: A,
    actor: &Actor,
    note: Option<String>,
) -> Result<WorkflowInstance<S>, WorkflowError>
where
    S: WorkflowState,
    A: WorkflowAction<S>,
{
    transition_at(definition, instance, action, actor, note, Utc::now())
}

/// Apply `action` to `instance` with an explicit timestamp.
///
/// Checks run in a fixed order: a target equal to the current state is a no-op, a missing
/// edge is illegal, and only then are the edge's roles and ownership guard consulted.
pub fn transition_at<S, A>(
    definition: &WorkflowDefinition<S, A>,
    instance: &WorkflowInstance<S>,
    action: A,
    actor: &Actor,
    note: Option<String>,
    at: DateTime<Utc>,
) -> Result<WorkflowInstance<S>, WorkflowError>
where
    S: WorkflowState,
    A: WorkflowAction<S>,
{
    let current = instance.current_state();
    let target = action.target();

    if target == current {
        return Err(WorkflowError::NoOpTransition {
            state: current.state_label(),
        });
    }

    let rule = definition
        .rule(current, action)
        .ok_or(WorkflowError::IllegalTransition {
            state: current.state_label(),
            action: action.action_label(),
        })?;

    authorize(rule, actor, instance).map_err(|reason| WorkflowError::Forbidden {
        role: actor.role,
        state: current.state_label(),
        action: action.action_label(),
        reason,
    })?;

    debug!(
        workflow = definition.name(),
        instance = %instance.id,
        from = current.state_label(),
        to = target.state_label(),
        role = %actor.role,
        "transition applied"
    );

    let entry = HistoryEntry {
        from_state: Some(current),
        to_state: target,
        actor: ActorStamp::from(actor),
        timestamp: at,
        note: normalize_note(note),
    };

    Ok(instance.clone().advance(entry))
}

/// Actions `actor` could legally take from the instance's current state.
pub fn available_actions<S, A>(
    definition: &WorkflowDefinition<S, A>,
    instance: &WorkflowInstance<S>,
    actor: &Actor,
) -> Vec<A>
where
    S: WorkflowState,
    A: WorkflowAction<S>,
{
    definition
        .outgoing(instance.current_state())
        .filter(|rule| authorize(rule, actor, instance).is_ok())
        .map(|rule| rule.action)
        .collect()
}

fn authorize<S, A>(
    rule: &TransitionRule<S, A>,
    actor: &Actor,
    instance: &WorkflowInstance<S>,
) -> Result<(), ForbiddenReason>
where
    S: WorkflowState,
    A: WorkflowAction<S>,
{
    if !rule.permits_role(actor.role) {
        return Err(ForbiddenReason::RoleNotPermitted);
    }
    rule.guard.check(actor, instance.owner())
}
