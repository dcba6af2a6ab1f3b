//! Persistence-aware services wrapping the pure workflows.
//!
//! The workflows never touch storage. These services load a record, run the transition,
//! save it against the version they read, and only then publish an audit event.

pub mod applications;
pub mod approvals;
pub mod repository;

#[cfg(test)]
mod tests;

pub use applications::{ApplicationService, ApplicationServiceError};
pub use approvals::{ApprovalService, ApprovalServiceError, BulkItemError, BulkReport};
pub use repository::{
    ensure_unique_key, AuditError, AuditEvent, AuditPublisher, InstanceRepository, JobCatalog,
    ProfileDirectory, RepositoryError, StoredInstance,
};
