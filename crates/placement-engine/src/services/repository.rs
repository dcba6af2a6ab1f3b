use crate::matching::{CandidateProfile, JobId, JobPosting};
use crate::workflows::application::{ApplicationRecord, ApplicationStatus};
use crate::workflows::approval::ApprovalRecord;
use crate::workflows::engine::{ActorStamp, HistoryEntry, InstanceId, UserId, WorkflowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted record wrapping one workflow instance.
pub trait StoredInstance: Clone + Send + Sync {
    fn instance_id(&self) -> &InstanceId;
    fn version(&self) -> u64;

    /// Key no two live records may share. `None` means the record is unconstrained.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

impl StoredInstance for ApplicationRecord {
    fn instance_id(&self) -> &InstanceId {
        &self.instance.id
    }

    fn version(&self) -> u64 {
        self.instance.version()
    }

    /// One live application per student and job; withdrawn ones release the key.
    fn unique_key(&self) -> Option<String> {
        if self.instance.current_state() == ApplicationStatus::Withdrawn {
            return None;
        }
        let applicant = self.instance.owner().applicant_id.as_ref()?;
        Some(format!("{}/{}", self.job_id, applicant))
    }
}

impl StoredInstance for ApprovalRecord {
    fn instance_id(&self) -> &InstanceId {
        &self.instance.id
    }

    fn version(&self) -> u64 {
        self.instance.version()
    }
}

/// Storage abstraction with optimistic concurrency on [`StoredInstance::version`].
pub trait InstanceRepository<R>: Send + Sync
where
    R: StoredInstance,
{
    /// Store a new record. Must fail with `Duplicate` for a known id and `KeyTaken` when a
    /// stored record holds the same [`StoredInstance::unique_key`], checked atomically with
    /// the write.
    fn insert(&self, record: R) -> Result<R, RepositoryError>;
    fn fetch(&self, id: &InstanceId) -> Result<Option<R>, RepositoryError>;
    /// Replace the stored record only if its version still equals `expected_version`.
    fn save(&self, record: R, expected_version: u64) -> Result<R, RepositoryError>;
    fn list(&self) -> Result<Vec<R>, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record {0} already exists")]
    Duplicate(InstanceId),
    #[error("stored version {found} does not match expected {expected}")]
    Conflict { expected: u64, found: u64 },
    #[error("a live record already holds key {key}")]
    KeyTaken { key: String },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Unique-key check for [`InstanceRepository::insert`] implementations, run under the same
/// lock as the write.
pub fn ensure_unique_key<'a, R>(
    stored: impl IntoIterator<Item = &'a R>,
    record: &R,
) -> Result<(), RepositoryError>
where
    R: StoredInstance + 'a,
{
    let Some(key) = record.unique_key() else {
        return Ok(());
    };
    if stored
        .into_iter()
        .any(|existing| existing.unique_key().as_deref() == Some(key.as_str()))
    {
        return Err(RepositoryError::KeyTaken { key });
    }
    Ok(())
}

/// First sequence number above every `<prefix>-<n>` id already stored.
pub(crate) fn next_free_sequence<R: StoredInstance>(stored: &[R]) -> u64 {
    stored
        .iter()
        .filter_map(|record| record.instance_id().0.rsplit_once('-'))
        .filter_map(|(_, suffix)| suffix.parse::<u64>().ok())
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}

/// Read-only lookup of job postings owned by recruiting organizations.
pub trait JobCatalog: Send + Sync {
    fn job(&self, id: &JobId) -> Option<JobPosting>;
}

/// Read-only lookup of student academic profiles.
pub trait ProfileDirectory: Send + Sync {
    fn profile(&self, user_id: &UserId) -> Option<CandidateProfile>;
}

/// Outbound hook receiving one event per persisted transition.
pub trait AuditPublisher: Send + Sync {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub workflow: String,
    pub instance_id: InstanceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_state: Option<String>,
    pub to_state: String,
    pub actor: ActorStamp,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AuditEvent {
    pub fn from_entry<S>(workflow: &str, instance_id: &InstanceId, entry: &HistoryEntry<S>) -> Self
    where
        S: WorkflowState,
    {
        Self {
            workflow: workflow.to_string(),
            instance_id: instance_id.clone(),
            from_state: entry.from_state.map(|state| state.state_label().to_string()),
            to_state: entry.to_state.state_label().to_string(),
            actor: entry.actor.clone(),
            timestamp: entry.timestamp,
            note: entry.note.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    #[error("audit transport unavailable: {0}")]
    Transport(String),
}
