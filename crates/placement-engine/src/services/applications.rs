use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::repository::{
    next_free_sequence, AuditError, AuditEvent, AuditPublisher, InstanceRepository, JobCatalog,
    ProfileDirectory, RepositoryError,
};
use crate::error::ErrorKind;
use crate::matching::{
    rank_scored, unmet_criteria, CriteriaError, JobId, JobPosting, MatchResult, MatchScorer,
    RankedCandidate, UnmetCriterion,
};
use crate::workflows::application::{
    status_view, timeline, ApplicationRecord, ApplicationStatus, ApplicationStatusView,
    ApplicationWorkflow, TimelineEntry,
};
use crate::workflows::engine::{Actor, ActorRole, InstanceId, UserId, WorkflowError};

/// Service composing the application workflow, job catalog, student profiles, and audit log.
pub struct ApplicationService<R, C, P, A> {
    workflow: ApplicationWorkflow,
    repository: Arc<R>,
    jobs: Arc<C>,
    profiles: Arc<P>,
    audit: Arc<A>,
    sequence: AtomicU64,
}

impl<R, C, P, A> ApplicationService<R, C, P, A>
where
    R: InstanceRepository<ApplicationRecord> + 'static,
    C: JobCatalog + 'static,
    P: ProfileDirectory + 'static,
    A: AuditPublisher + 'static,
{
    pub fn new(repository: Arc<R>, jobs: Arc<C>, profiles: Arc<P>, audit: Arc<A>) -> Self {
        Self {
            workflow: ApplicationWorkflow::standard(),
            repository,
            jobs,
            profiles,
            audit,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn workflow(&self) -> &ApplicationWorkflow {
        &self.workflow
    }

    /// Submit a student's application to a job after checking the hard criteria.
    pub fn apply(
        &self,
        job_id: &JobId,
        student: &Actor,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.apply_at(job_id, student, Utc::now())
    }

    pub fn apply_at(
        &self,
        job_id: &JobId,
        student: &Actor,
        at: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        if student.role != ActorRole::Student {
            return Err(ApplicationServiceError::NotAStudent { role: student.role });
        }

        let job = self.job(job_id)?;
        job.criteria.validate()?;

        let profile = self
            .profiles
            .profile(&student.user_id)
            .ok_or_else(|| ApplicationServiceError::MissingProfile(student.user_id.clone()))?;

        let unmet = unmet_criteria(&job.criteria, &profile);
        if !unmet.is_empty() {
            return Err(ApplicationServiceError::Ineligible { unmet });
        }

        let existing = self.repository.list()?;
        let duplicate = existing.iter().any(|record| {
            record.job_id == job.id
                && record.instance.owner().applicant_id.as_ref() == Some(&student.user_id)
                && record.instance.current_state() != ApplicationStatus::Withdrawn
        });
        if duplicate {
            return Err(ApplicationServiceError::AlreadyApplied {
                job_id: job.id.clone(),
            });
        }

        let instance = self.workflow.open(
            self.next_application_id(&existing),
            student,
            job.organization_id.clone(),
            at,
        );
        let stored = self
            .repository
            .insert(ApplicationRecord {
                job_id: job.id.clone(),
                criteria: job.criteria.clone(),
                instance,
            })
            .map_err(|err| match err {
                RepositoryError::KeyTaken { .. } => ApplicationServiceError::AlreadyApplied {
                    job_id: job.id.clone(),
                },
                other => other.into(),
            })?;

        self.publish_latest(&stored)?;
        info!(
            application = %stored.instance.id,
            job = %stored.job_id,
            applicant = %student.user_id,
            "application submitted"
        );
        Ok(stored)
    }

    /// Move an application to `status`, persisting against the version that was read.
    pub fn update_status(
        &self,
        id: &InstanceId,
        status: ApplicationStatus,
        actor: &Actor,
        feedback: Option<String>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self.get(id)?;
        let expected_version = record.instance.version();
        let updated = self
            .workflow
            .update_status(&record.instance, status, actor, feedback)?;

        let stored = self
            .repository
            .save(
                ApplicationRecord {
                    job_id: record.job_id,
                    criteria: record.criteria,
                    instance: updated,
                },
                expected_version,
            )
            .map_err(|err| conflict_or_repository::<ApplicationServiceError>(id, err))?;

        self.publish_latest(&stored)?;
        info!(
            application = %id,
            status = status.label(),
            actor = %actor.user_id,
            "application status updated"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &InstanceId) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn timeline(
        &self,
        id: &InstanceId,
    ) -> Result<Vec<TimelineEntry>, ApplicationServiceError> {
        Ok(timeline(&self.get(id)?.instance))
    }

    pub fn status(
        &self,
        id: &InstanceId,
    ) -> Result<ApplicationStatusView, ApplicationServiceError> {
        Ok(status_view(&self.get(id)?.instance))
    }

    pub fn next_statuses(
        &self,
        id: &InstanceId,
        actor: &Actor,
    ) -> Result<Vec<ApplicationStatus>, ApplicationServiceError> {
        let record = self.get(id)?;
        Ok(self.workflow.next_statuses(&record.instance, actor))
    }

    /// Score the applicant of a stored application against its job, using the criteria
    /// captured when the application was accepted.
    pub fn match_for(&self, id: &InstanceId) -> Result<MatchResult, ApplicationServiceError> {
        let record = self.get(id)?;
        let job = self.job(&record.job_id)?;
        let applicant = record
            .instance
            .owner()
            .applicant_id
            .clone()
            .ok_or(RepositoryError::NotFound)?;
        let profile = self
            .profiles
            .profile(&applicant)
            .ok_or(ApplicationServiceError::MissingProfile(applicant))?;
        Ok(MatchScorer::score(&as_accepted(job, &record), &profile))
    }

    /// Rank the live applications for a job, ties in id order. Withdrawn and rejected
    /// applications are left out, as are applicants without a profile.
    pub fn rank_applicants(
        &self,
        job_id: &JobId,
    ) -> Result<Vec<RankedCandidate<InstanceId>>, ApplicationServiceError> {
        let job = self.job(job_id)?;
        let mut records: Vec<_> = self
            .repository
            .list()?
            .into_iter()
            .filter(|record| record.job_id == job.id)
            .filter(|record| {
                !matches!(
                    record.instance.current_state(),
                    ApplicationStatus::Withdrawn | ApplicationStatus::Rejected
                )
            })
            .collect();
        records.sort_by(|a, b| a.instance.id.cmp(&b.instance.id));

        let mut scored = Vec::with_capacity(records.len());
        for record in records {
            let Some(applicant) = record.instance.owner().applicant_id.clone() else {
                continue;
            };
            match self.profiles.profile(&applicant) {
                Some(profile) => scored.push(RankedCandidate {
                    result: MatchScorer::score(&as_accepted(job.clone(), &record), &profile),
                    key: record.instance.id,
                }),
                None => warn!(
                    application = %record.instance.id,
                    applicant = %applicant,
                    "skipping applicant without profile"
                ),
            }
        }

        Ok(rank_scored(scored))
    }

    fn job(&self, job_id: &JobId) -> Result<JobPosting, ApplicationServiceError> {
        self.jobs
            .job(job_id)
            .ok_or_else(|| ApplicationServiceError::UnknownJob(job_id.clone()))
    }

    fn publish_latest(&self, record: &ApplicationRecord) -> Result<(), ApplicationServiceError> {
        if let Some(entry) = record.instance.latest() {
            self.audit.publish(AuditEvent::from_entry(
                self.workflow.definition().name(),
                &record.instance.id,
                entry,
            ))?;
        }
        Ok(())
    }

    fn next_application_id(&self, stored: &[ApplicationRecord]) -> InstanceId {
        self.sequence.fetch_max(next_free_sequence(stored), Ordering::Relaxed);
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        InstanceId(format!("app-{id:06}"))
    }
}

/// The posting with its criteria replaced by the snapshot stored on the application.
fn as_accepted(mut job: JobPosting, record: &ApplicationRecord) -> JobPosting {
    job.criteria = record.criteria.clone();
    job
}

pub(crate) fn conflict_or_repository<E>(id: &InstanceId, err: RepositoryError) -> E
where
    E: From<WorkflowError> + From<RepositoryError>,
{
    match err {
        RepositoryError::Conflict { expected, found } => E::from(WorkflowError::ConflictingState {
            id: id.clone(),
            expected,
            found,
        }),
        other => E::from(other),
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("job {0} does not exist")]
    UnknownJob(JobId),
    #[error("no academic profile on file for {0}")]
    MissingProfile(UserId),
    #[error("only students can apply to jobs (requested by {role})")]
    NotAStudent { role: ActorRole },
    #[error("candidate does not meet the job criteria: {}", summarize(.unmet))]
    Ineligible { unmet: Vec<UnmetCriterion> },
    #[error("an application for job {job_id} already exists")]
    AlreadyApplied { job_id: JobId },
}

impl ApplicationServiceError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Workflow(err) => Some(err.kind()),
            Self::Criteria(err) => Some(err.kind()),
            Self::NotAStudent { .. } => Some(ErrorKind::Forbidden),
            _ => None,
        }
    }
}

fn summarize(unmet: &[UnmetCriterion]) -> String {
    unmet
        .iter()
        .map(UnmetCriterion::summary)
        .collect::<Vec<_>>()
        .join("; ")
}
