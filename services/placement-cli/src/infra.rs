use clap::ValueEnum;
use placement_engine::error::AppError;
use placement_engine::matching::{CandidateProfile, JobId, JobPosting};
use placement_engine::services::{
    ensure_unique_key, AuditError, AuditEvent, AuditPublisher, InstanceRepository, JobCatalog,
    ProfileDirectory, RepositoryError, StoredInstance,
};
use placement_engine::workflows::approval::ApprovalDecision;
use placement_engine::workflows::engine::{ActorRole, InstanceId, UserId};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct InMemoryRepository<R> {
    records: Arc<Mutex<HashMap<InstanceId, R>>>,
}

impl<R> Default for InMemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<R> InMemoryRepository<R> {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<InstanceId, R>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl<R> InstanceRepository<R> for InMemoryRepository<R>
where
    R: StoredInstance,
{
    fn insert(&self, record: R) -> Result<R, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(record.instance_id()) {
            return Err(RepositoryError::Duplicate(record.instance_id().clone()));
        }
        ensure_unique_key(guard.values(), &record)?;
        guard.insert(record.instance_id().clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &InstanceId) -> Result<Option<R>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn save(&self, record: R, expected_version: u64) -> Result<R, RepositoryError> {
        let mut guard = self.lock()?;
        let found = guard
            .get(record.instance_id())
            .map(|stored| stored.version())
            .ok_or(RepositoryError::NotFound)?;
        if found != expected_version {
            return Err(RepositoryError::Conflict {
                expected: expected_version,
                found,
            });
        }
        guard.insert(record.instance_id().clone(), record.clone());
        Ok(record)
    }

    fn list(&self) -> Result<Vec<R>, RepositoryError> {
        let mut records: Vec<R> = self.lock()?.values().cloned().collect();
        records.sort_by(|a, b| a.instance_id().cmp(b.instance_id()));
        Ok(records)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryJobCatalog {
    jobs: Mutex<HashMap<JobId, JobPosting>>,
}

impl InMemoryJobCatalog {
    pub(crate) fn with_jobs(jobs: impl IntoIterator<Item = JobPosting>) -> Self {
        Self {
            jobs: Mutex::new(jobs.into_iter().map(|job| (job.id.clone(), job)).collect()),
        }
    }
}

impl JobCatalog for InMemoryJobCatalog {
    fn job(&self, id: &JobId) -> Option<JobPosting> {
        self.jobs.lock().ok()?.get(id).cloned()
    }
}

#[derive(Default)]
pub(crate) struct InMemoryProfileDirectory {
    profiles: Mutex<HashMap<UserId, CandidateProfile>>,
}

impl InMemoryProfileDirectory {
    pub(crate) fn with_profiles(
        profiles: impl IntoIterator<Item = (UserId, CandidateProfile)>,
    ) -> Self {
        Self {
            profiles: Mutex::new(profiles.into_iter().collect()),
        }
    }
}

impl ProfileDirectory for InMemoryProfileDirectory {
    fn profile(&self, user_id: &UserId) -> Option<CandidateProfile> {
        self.profiles.lock().ok()?.get(user_id).cloned()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAuditLog {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditLog {
    pub(crate) fn recorded(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or_default()
    }
}

impl AuditPublisher for InMemoryAuditLog {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError> {
        debug!(
            workflow = %event.workflow,
            instance = %event.instance_id,
            to = %event.to_state,
            "audit event recorded"
        );
        self.events
            .lock()
            .map_err(|_| AuditError::Transport("audit mutex poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RoleArg {
    Student,
    Recruiter,
    Tpo,
    Admin,
}

impl From<RoleArg> for ActorRole {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Student => ActorRole::Student,
            RoleArg::Recruiter => ActorRole::Recruiter,
            RoleArg::Tpo => ActorRole::Tpo,
            RoleArg::Admin => ActorRole::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DecisionArg {
    Approve,
    Reject,
}

impl From<DecisionArg> for ApprovalDecision {
    fn from(value: DecisionArg) -> Self {
        match value {
            DecisionArg::Approve => ApprovalDecision::Approve,
            DecisionArg::Reject => ApprovalDecision::Reject,
        }
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
