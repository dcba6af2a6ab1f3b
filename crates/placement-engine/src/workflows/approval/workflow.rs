use super::domain::{
    ApprovalDecision, ApprovalInstance, ApprovalRecord, ApprovalStatus, ApprovalSubject,
};
use crate::workflows::engine::{
    self, Actor, ActorRole, Guard, InstanceId, OrganizationId, Ownership, TransitionRule,
    WorkflowDefinition, WorkflowError,
};
use chrono::{DateTime, Utc};

const REVIEWERS: &[ActorRole] = &[ActorRole::Tpo, ActorRole::Admin];

/// Rejection is terminal: a rejected organization or recruiter re-applies as a new entity.
#[derive(Debug)]
pub struct ApprovalWorkflow {
    definition: WorkflowDefinition<ApprovalStatus, ApprovalDecision>,
}

impl ApprovalWorkflow {
    pub fn standard() -> Self {
        let definition = WorkflowDefinition::new(
            "approval",
            ApprovalStatus::ordered().to_vec(),
            ApprovalStatus::Pending,
            vec![ApprovalStatus::Approved, ApprovalStatus::Rejected],
            vec![
                review(ApprovalDecision::Approve),
                review(ApprovalDecision::Reject),
            ],
        );
        debug_assert!(definition.validate().is_ok());

        Self { definition }
    }

    pub fn definition(&self) -> &WorkflowDefinition<ApprovalStatus, ApprovalDecision> {
        &self.definition
    }

    pub fn open(
        &self,
        id: InstanceId,
        subject: ApprovalSubject,
        organization_id: OrganizationId,
        submitted_by: &Actor,
        at: DateTime<Utc>,
    ) -> ApprovalRecord {
        let instance = ApprovalInstance::start(
            &self.definition,
            id,
            Ownership::organization(organization_id),
            submitted_by,
            at,
            None,
        );
        ApprovalRecord { subject, instance }
    }

    pub fn decide(
        &self,
        instance: &ApprovalInstance,
        decision: ApprovalDecision,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<ApprovalInstance, WorkflowError> {
        engine::transition(&self.definition, instance, decision, actor, notes)
    }

    pub fn decide_at(
        &self,
        instance: &ApprovalInstance,
        decision: ApprovalDecision,
        actor: &Actor,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<ApprovalInstance, WorkflowError> {
        engine::transition_at(&self.definition, instance, decision, actor, notes, at)
    }
}

fn review(decision: ApprovalDecision) -> TransitionRule<ApprovalStatus, ApprovalDecision> {
    TransitionRule {
        from: ApprovalStatus::Pending,
        action: decision,
        roles: REVIEWERS,
        guard: Guard::Unrestricted,
    }
}
