use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::config::BulkConfig;
use crate::matching::{CandidateProfile, EligibilityCriteria, JobId, JobPosting};
use crate::services::repository::{
    ensure_unique_key, AuditError, AuditEvent, AuditPublisher, InstanceRepository, JobCatalog,
    ProfileDirectory, RepositoryError, StoredInstance,
};
use crate::services::{ApplicationService, ApprovalService};
use crate::workflows::application::ApplicationRecord;
use crate::workflows::approval::ApprovalRecord;
use crate::workflows::engine::{Actor, ActorRole, InstanceId, OrganizationId, UserId};

pub(super) const CSE: &str = "Computer Science Engineering";
pub(super) const ORG: &str = "org-initech";

pub(super) fn frontend_job() -> JobPosting {
    JobPosting {
        id: JobId("job-frontend".to_string()),
        organization_id: OrganizationId(ORG.to_string()),
        title: "Frontend Engineer".to_string(),
        criteria: EligibilityCriteria {
            min_cgpa: Some(7.5),
            allowed_branches: Some(BTreeSet::from([CSE.to_string()])),
            graduation_year: None,
        },
        required_skills: vec!["JavaScript".to_string(), "React".to_string()],
        experience_required: 0,
    }
}

pub(super) fn profile(cgpa: f32) -> CandidateProfile {
    CandidateProfile {
        cgpa,
        branch: CSE.to_string(),
        graduation_year: 2025,
        skills: vec![
            "JavaScript".to_string(),
            "React".to_string(),
            "Node.js".to_string(),
        ],
        experience_years: 0,
    }
}

pub(super) fn student(id: &str) -> Actor {
    Actor::new(id, ActorRole::Student)
}

pub(super) fn recruiter() -> Actor {
    Actor::new("rec-7", ActorRole::Recruiter).in_organization(ORG)
}

pub(super) fn tpo() -> Actor {
    Actor::new("tpo-1", ActorRole::Tpo)
}

#[derive(Clone)]
pub(super) struct MemoryRepository<R> {
    pub(super) records: Arc<Mutex<HashMap<InstanceId, R>>>,
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<R> InstanceRepository<R> for MemoryRepository<R>
where
    R: StoredInstance,
{
    fn insert(&self, record: R) -> Result<R, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(record.instance_id()) {
            return Err(RepositoryError::Duplicate(record.instance_id().clone()));
        }
        ensure_unique_key(guard.values(), &record)?;
        guard.insert(record.instance_id().clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &InstanceId) -> Result<Option<R>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn save(&self, record: R, expected_version: u64) -> Result<R, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
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
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

/// Serves the first copy it ever read for an id, as a concurrent reader would.
pub(super) struct StaleReads<R> {
    pub(super) inner: MemoryRepository<R>,
    snapshots: Mutex<HashMap<InstanceId, R>>,
}

impl<R> Default for StaleReads<R> {
    fn default() -> Self {
        Self {
            inner: MemoryRepository::default(),
            snapshots: Mutex::new(HashMap::new()),
        }
    }
}

impl<R> InstanceRepository<R> for StaleReads<R>
where
    R: StoredInstance,
{
    fn insert(&self, record: R) -> Result<R, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &InstanceId) -> Result<Option<R>, RepositoryError> {
        let mut snapshots = self.snapshots.lock().expect("snapshot mutex poisoned");
        if let Some(record) = snapshots.get(id) {
            return Ok(Some(record.clone()));
        }
        let fresh = self.inner.fetch(id)?;
        if let Some(record) = &fresh {
            snapshots.insert(id.clone(), record.clone());
        }
        Ok(fresh)
    }

    fn save(&self, record: R, expected_version: u64) -> Result<R, RepositoryError> {
        self.inner.save(record, expected_version)
    }

    fn list(&self) -> Result<Vec<R>, RepositoryError> {
        self.inner.list()
    }
}

/// Lists nothing, like a reader racing an insert that has not landed yet.
pub(super) struct BlindListing<R> {
    pub(super) inner: MemoryRepository<R>,
}

impl<R> Default for BlindListing<R> {
    fn default() -> Self {
        Self {
            inner: MemoryRepository::default(),
        }
    }
}

impl<R> InstanceRepository<R> for BlindListing<R>
where
    R: StoredInstance,
{
    fn insert(&self, record: R) -> Result<R, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &InstanceId) -> Result<Option<R>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn save(&self, record: R, expected_version: u64) -> Result<R, RepositoryError> {
        self.inner.save(record, expected_version)
    }

    fn list(&self) -> Result<Vec<R>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl<R> InstanceRepository<R> for UnavailableRepository
where
    R: StoredInstance,
{
    fn insert(&self, _record: R) -> Result<R, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &InstanceId) -> Result<Option<R>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save(&self, _record: R, _expected_version: u64) -> Result<R, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<R>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryJobs {
    pub(super) jobs: Mutex<HashMap<JobId, JobPosting>>,
}

impl MemoryJobs {
    pub(super) fn with(jobs: impl IntoIterator<Item = JobPosting>) -> Self {
        Self {
            jobs: Mutex::new(jobs.into_iter().map(|job| (job.id.clone(), job)).collect()),
        }
    }
}

impl JobCatalog for MemoryJobs {
    fn job(&self, id: &JobId) -> Option<JobPosting> {
        self.jobs.lock().expect("jobs mutex poisoned").get(id).cloned()
    }
}

#[derive(Default)]
pub(super) struct MemoryProfiles {
    pub(super) profiles: Mutex<HashMap<UserId, CandidateProfile>>,
}

impl MemoryProfiles {
    pub(super) fn add(&self, user: &str, profile: CandidateProfile) {
        self.profiles
            .lock()
            .expect("profiles mutex poisoned")
            .insert(UserId(user.to_string()), profile);
    }
}

impl ProfileDirectory for MemoryProfiles {
    fn profile(&self, user_id: &UserId) -> Option<CandidateProfile> {
        self.profiles
            .lock()
            .expect("profiles mutex poisoned")
            .get(user_id)
            .cloned()
    }
}

#[derive(Default)]
pub(super) struct MemoryAudit {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAudit {
    pub(super) fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditPublisher for MemoryAudit {
    fn publish(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events.lock().expect("audit mutex poisoned").push(event);
        Ok(())
    }
}

pub(super) struct OfflineAudit;

impl AuditPublisher for OfflineAudit {
    fn publish(&self, _event: AuditEvent) -> Result<(), AuditError> {
        Err(AuditError::Transport("broker offline".to_string()))
    }
}

pub(super) type TestApplications = ApplicationService<
    MemoryRepository<ApplicationRecord>,
    MemoryJobs,
    MemoryProfiles,
    MemoryAudit,
>;

pub(super) struct ApplicationHarness {
    pub(super) service: TestApplications,
    pub(super) repository: Arc<MemoryRepository<ApplicationRecord>>,
    pub(super) jobs: Arc<MemoryJobs>,
    pub(super) profiles: Arc<MemoryProfiles>,
    pub(super) audit: Arc<MemoryAudit>,
}

pub(super) fn application_harness() -> ApplicationHarness {
    let repository = Arc::new(MemoryRepository::default());
    let jobs = Arc::new(MemoryJobs::with([frontend_job()]));
    let profiles = Arc::new(MemoryProfiles::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = ApplicationService::new(
        repository.clone(),
        jobs.clone(),
        profiles.clone(),
        audit.clone(),
    );
    ApplicationHarness {
        service,
        repository,
        jobs,
        profiles,
        audit,
    }
}

pub(super) fn approval_service(
    max_items: usize,
) -> (
    ApprovalService<MemoryRepository<ApprovalRecord>, MemoryAudit>,
    Arc<MemoryRepository<ApprovalRecord>>,
    Arc<MemoryAudit>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = ApprovalService::new(repository.clone(), audit.clone(), BulkConfig { max_items });
    (service, repository, audit)
}
