use super::domain::{ApplicationInstance, ApplicationStatus};
use crate::workflows::engine::{
    self, Actor, ActorRole, Guard, InstanceId, OrganizationId, Ownership, TransitionRule,
    WorkflowDefinition, WorkflowError,
};
use chrono::{DateTime, Utc};

const STAFF: &[ActorRole] = &[ActorRole::Recruiter, ActorRole::Tpo, ActorRole::Admin];
const APPLICANT: &[ActorRole] = &[ActorRole::Student];

#[derive(Debug)]
pub struct ApplicationWorkflow {
    definition: WorkflowDefinition<ApplicationStatus, ApplicationStatus>,
}

impl ApplicationWorkflow {
    pub fn standard() -> Self {
        let definition = WorkflowDefinition::new(
            "application",
            ApplicationStatus::ordered().to_vec(),
            ApplicationStatus::Applied,
            vec![
                ApplicationStatus::Selected,
                ApplicationStatus::Rejected,
                ApplicationStatus::Withdrawn,
            ],
            standard_rules(),
        );
        debug_assert!(definition.validate().is_ok());

        Self { definition }
    }

    pub fn definition(&self) -> &WorkflowDefinition<ApplicationStatus, ApplicationStatus> {
        &self.definition
    }

    /// Open a new application in `applied`, owned by the applicant and the job's organization.
    pub fn open(
        &self,
        id: InstanceId,
        applicant: &Actor,
        job_organization: OrganizationId,
        at: DateTime<Utc>,
    ) -> ApplicationInstance {
        let owner = Ownership::application(job_organization, applicant.user_id.clone());
        ApplicationInstance::start(&self.definition, id, owner, applicant, at, None)
    }

    /// Move an application to `status`, recording optional reviewer feedback.
    pub fn update_status(
        &self,
        instance: &ApplicationInstance,
        status: ApplicationStatus,
        actor: &Actor,
        feedback: Option<String>,
    ) -> Result<ApplicationInstance, WorkflowError> {
        engine::transition(&self.definition, instance, status, actor, feedback)
    }

    pub fn update_status_at(
        &self,
        instance: &ApplicationInstance,
        status: ApplicationStatus,
        actor: &Actor,
        feedback: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<ApplicationInstance, WorkflowError> {
        engine::transition_at(&self.definition, instance, status, actor, feedback, at)
    }

    /// Statuses the actor may select next, in table order.
    pub fn next_statuses(
        &self,
        instance: &ApplicationInstance,
        actor: &Actor,
    ) -> Vec<ApplicationStatus> {
        engine::available_actions(&self.definition, instance, actor)
    }
}

fn staff(
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> TransitionRule<ApplicationStatus, ApplicationStatus> {
    TransitionRule {
        from,
        action: to,
        roles: STAFF,
        guard: Guard::SameOrganization,
    }
}

fn applicant(from: ApplicationStatus) -> TransitionRule<ApplicationStatus, ApplicationStatus> {
    TransitionRule {
        from,
        action: ApplicationStatus::Withdrawn,
        roles: APPLICANT,
        guard: Guard::OwningApplicant,
    }
}

fn standard_rules() -> Vec<TransitionRule<ApplicationStatus, ApplicationStatus>> {
    use ApplicationStatus::*;

    vec![
        staff(Applied, Screening),
        staff(Screening, Shortlisted),
        staff(Shortlisted, Interviewed),
        staff(Interviewed, Selected),
        staff(Interviewed, Rejected),
        staff(Applied, Rejected),
        staff(Screening, Rejected),
        staff(Shortlisted, Rejected),
        applicant(Applied),
        applicant(Screening),
    ]
}
