use crate::workflows::engine::{
    self, Actor, InstanceId, WorkflowAction, WorkflowDefinition, WorkflowError, WorkflowInstance,
    WorkflowState,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// One item a bulk operation could not transition. The item's state is unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure<E = WorkflowError> {
    pub id: InstanceId,
    pub error: E,
}

/// Per-item outcome of a bulk transition. `succeeded` holds the advanced instances so the
/// caller can persist each one individually.
#[derive(Debug, Clone)]
pub struct BulkOutcome<S> {
    pub succeeded: Vec<WorkflowInstance<S>>,
    pub failed: Vec<BulkFailure>,
}

impl<S> BulkOutcome<S> {
    pub fn succeeded_ids(&self) -> Vec<InstanceId> {
        self.succeeded
            .iter()
            .map(|instance| instance.id.clone())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

impl<S> Default for BulkOutcome<S> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Apply the same action to every instance, independently. Never stops at the first failure.
pub fn apply_bulk<S, A, I>(
    definition: &WorkflowDefinition<S, A>,
    instances: I,
    action: A,
    actor: &Actor,
    notes: Option<&str>,
) -> BulkOutcome<S>
where
    S: WorkflowState,
    A: WorkflowAction<S>,
    I: IntoIterator<Item = WorkflowInstance<S>>,
{
    apply_bulk_at(definition, instances, action, actor, notes, Utc::now())
}

/// Like [`apply_bulk`], stamping every history entry with `at`.
pub fn apply_bulk_at<S, A, I>(
    definition: &WorkflowDefinition<S, A>,
    instances: I,
    action: A,
    actor: &Actor,
    notes: Option<&str>,
    at: DateTime<Utc>,
) -> BulkOutcome<S>
where
    S: WorkflowState,
    A: WorkflowAction<S>,
    I: IntoIterator<Item = WorkflowInstance<S>>,
{
    let mut outcome = BulkOutcome::default();

    for instance in instances {
        let note = notes.map(str::to_string);
        match engine::transition_at(definition, &instance, action, actor, note, at) {
            Ok(updated) => outcome.succeeded.push(updated),
            Err(error) => {
                warn!(
                    workflow = definition.name(),
                    instance = %instance.id,
                    action = action.action_label(),
                    %error,
                    "bulk item rejected"
                );
                outcome.failed.push(BulkFailure {
                    id: instance.id,
                    error,
                });
            }
        }
    }

    info!(
        workflow = definition.name(),
        action = action.action_label(),
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "bulk transition finished"
    );

    outcome
}
