use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::applications::conflict_or_repository;
use super::repository::{
    next_free_sequence, AuditError, AuditEvent, AuditPublisher, InstanceRepository,
    RepositoryError,
};
use crate::config::BulkConfig;
use crate::error::ErrorKind;
use crate::workflows::approval::{
    ApprovalDecision, ApprovalRecord, ApprovalStatus, ApprovalSubject, ApprovalWorkflow,
};
use crate::workflows::engine::{Actor, InstanceId, OrganizationId, WorkflowError};
use crate::workflows::{apply_bulk_at, BulkFailure};

/// Why one item of a bulk decision was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BulkItemError {
    #[error(transparent)]
    Workflow(WorkflowError),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl BulkItemError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Workflow(err) => Some(err.kind()),
            Self::Repository(_) => None,
        }
    }
}

impl From<WorkflowError> for BulkItemError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

impl From<RepositoryError> for BulkItemError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

/// Persisted result of a bulk decision. Every requested id lands in exactly one list.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub succeeded: Vec<ApprovalRecord>,
    pub failed: Vec<BulkFailure<BulkItemError>>,
}

impl BulkReport {
    pub fn succeeded_ids(&self) -> Vec<InstanceId> {
        self.succeeded
            .iter()
            .map(|record| record.instance.id.clone())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Service driving organization and recruiter onboarding approvals.
pub struct ApprovalService<R, A> {
    workflow: ApprovalWorkflow,
    repository: Arc<R>,
    audit: Arc<A>,
    bulk: BulkConfig,
    sequence: AtomicU64,
}

impl<R, A> ApprovalService<R, A>
where
    R: InstanceRepository<ApprovalRecord> + 'static,
    A: AuditPublisher + 'static,
{
    pub fn new(repository: Arc<R>, audit: Arc<A>, bulk: BulkConfig) -> Self {
        Self {
            workflow: ApprovalWorkflow::standard(),
            repository,
            audit,
            bulk,
            sequence: AtomicU64::new(1),
        }
    }

    pub fn workflow(&self) -> &ApprovalWorkflow {
        &self.workflow
    }

    /// Register a new organization or recruiter awaiting review.
    pub fn submit(
        &self,
        subject: ApprovalSubject,
        organization_id: OrganizationId,
        submitted_by: &Actor,
    ) -> Result<ApprovalRecord, ApprovalServiceError> {
        let existing = self.repository.list()?;
        self.sequence.fetch_max(next_free_sequence(&existing), Ordering::Relaxed);
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        let id = InstanceId(format!("{}-{id:06}", subject.id_prefix()));
        let record = self
            .workflow
            .open(id, subject, organization_id, submitted_by, Utc::now());
        let stored = self.repository.insert(record)?;
        self.publish_latest(&stored)?;
        info!(
            approval = %stored.instance.id,
            subject = subject.label(),
            "approval submitted"
        );
        Ok(stored)
    }

    pub fn decide(
        &self,
        id: &InstanceId,
        decision: ApprovalDecision,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<ApprovalRecord, ApprovalServiceError> {
        let record = self.get(id)?;
        let expected_version = record.instance.version();
        let updated = self
            .workflow
            .decide(&record.instance, decision, actor, notes)?;
        let stored = self
            .repository
            .save(
                ApprovalRecord {
                    subject: record.subject,
                    instance: updated,
                },
                expected_version,
            )
            .map_err(|err| conflict_or_repository::<ApprovalServiceError>(id, err))?;

        self.publish_latest(&stored)?;
        info!(
            approval = %id,
            decision = decision.label(),
            actor = %actor.user_id,
            "approval decided"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &InstanceId) -> Result<ApprovalRecord, ApprovalServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Records still awaiting a decision, ordered by id.
    pub fn pending(&self) -> Result<Vec<ApprovalRecord>, ApprovalServiceError> {
        let mut pending: Vec<_> = self
            .repository
            .list()?
            .into_iter()
            .filter(|record| record.instance.current_state() == ApprovalStatus::Pending)
            .collect();
        pending.sort_by(|a, b| a.instance.id.cmp(&b.instance.id));
        Ok(pending)
    }

    /// Apply one decision to many records. Each item is loaded, transitioned, and saved on
    /// its own; a failing item never blocks the rest.
    pub fn bulk_decide(
        &self,
        ids: &[InstanceId],
        decision: ApprovalDecision,
        actor: &Actor,
        notes: Option<&str>,
    ) -> Result<BulkReport, ApprovalServiceError> {
        self.bulk_decide_at(ids, decision, actor, notes, Utc::now())
    }

    pub fn bulk_decide_at(
        &self,
        ids: &[InstanceId],
        decision: ApprovalDecision,
        actor: &Actor,
        notes: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<BulkReport, ApprovalServiceError> {
        if ids.len() > self.bulk.max_items {
            return Err(ApprovalServiceError::BulkLimitExceeded {
                requested: ids.len(),
                limit: self.bulk.max_items,
            });
        }

        let mut report = BulkReport::default();
        let mut loaded = Vec::with_capacity(ids.len());
        let mut read: HashMap<InstanceId, (ApprovalSubject, u64)> = HashMap::new();

        for id in ids {
            match self.repository.fetch(id) {
                Ok(Some(record)) => {
                    read.entry(id.clone())
                        .or_insert((record.subject, record.instance.version()));
                    loaded.push(record.instance);
                }
                Ok(None) => report.failed.push(BulkFailure {
                    id: id.clone(),
                    error: RepositoryError::NotFound.into(),
                }),
                Err(err) => report.failed.push(BulkFailure {
                    id: id.clone(),
                    error: err.into(),
                }),
            }
        }

        let outcome = apply_bulk_at(
            self.workflow.definition(),
            loaded,
            decision,
            actor,
            notes,
            at,
        );
        report
            .failed
            .extend(outcome.failed.into_iter().map(|failure| BulkFailure {
                id: failure.id,
                error: failure.error.into(),
            }));

        for instance in outcome.succeeded {
            let id = instance.id.clone();
            let Some(&(subject, expected_version)) = read.get(&id) else {
                continue;
            };
            match self
                .repository
                .save(ApprovalRecord { subject, instance }, expected_version)
            {
                Ok(stored) => {
                    if let Err(err) = self.publish_latest(&stored) {
                        warn!(approval = %id, error = %err, "audit publish failed after save");
                    }
                    report.succeeded.push(stored);
                }
                Err(err) => {
                    let error: BulkItemError = conflict_or_repository(&id, err);
                    warn!(approval = %id, %error, "bulk item not persisted");
                    report.failed.push(BulkFailure { id, error });
                }
            }
        }

        info!(
            decision = decision.label(),
            requested = ids.len(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "bulk approval finished"
        );
        Ok(report)
    }

    fn publish_latest(&self, record: &ApprovalRecord) -> Result<(), AuditError> {
        match record.instance.latest() {
            Some(entry) => self.audit.publish(AuditEvent::from_entry(
                self.workflow.definition().name(),
                &record.instance.id,
                entry,
            )),
            None => Ok(()),
        }
    }
}

/// Error raised by the approval service.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalServiceError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Audit(#[from] AuditError),
    #[error("bulk request of {requested} items exceeds the limit of {limit}")]
    BulkLimitExceeded { requested: usize, limit: usize },
}

impl ApprovalServiceError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Workflow(err) => Some(err.kind()),
            _ => None,
        }
    }
}
