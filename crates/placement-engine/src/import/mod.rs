//! CSV import of onboarding approvals awaiting a bulk decision.
//!
//! Expected columns: `id,subject,status,organization_id`. A blank status means pending.
//! Rows already decided are replayed through the approval workflow as the importing
//! reviewer, so they carry a full history.

mod parser;

use crate::workflows::approval::{
    ApprovalDecision, ApprovalRecord, ApprovalStatus, ApprovalSubject, ApprovalWorkflow,
};
use crate::workflows::engine::{Actor, InstanceId, OrganizationId, WorkflowError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    EmptyField { line: usize, field: &'static str },
    UnknownSubject { line: usize, value: String },
    UnknownStatus { line: usize, value: String },
    DuplicateId { line: usize, id: InstanceId },
    Workflow { line: usize, source: WorkflowError },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read approvals file: {}", err),
            ImportError::Csv(err) => write!(f, "invalid approvals CSV data: {}", err),
            ImportError::EmptyField { line, field } => {
                write!(f, "line {}: column '{}' is empty", line, field)
            }
            ImportError::UnknownSubject { line, value } => {
                write!(f, "line {}: unknown subject '{}'", line, value)
            }
            ImportError::UnknownStatus { line, value } => {
                write!(f, "line {}: unknown approval status '{}'", line, value)
            }
            ImportError::DuplicateId { line, id } => {
                write!(f, "line {}: id {} appears more than once", line, id)
            }
            ImportError::Workflow { line, source } => {
                write!(f, "line {}: could not replay decision: {}", line, source)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Workflow { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn approvals_from_path<P: AsRef<Path>>(
    path: P,
    imported_by: &Actor,
    at: DateTime<Utc>,
) -> Result<Vec<ApprovalRecord>, ImportError> {
    let file = File::open(path)?;
    approvals_from_reader(file, imported_by, at)
}

pub fn approvals_from_reader<R: Read>(
    reader: R,
    imported_by: &Actor,
    at: DateTime<Utc>,
) -> Result<Vec<ApprovalRecord>, ImportError> {
    let workflow = ApprovalWorkflow::standard();
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in parser::parse_rows(reader)? {
        let line = row.line;
        if row.id.is_empty() {
            return Err(ImportError::EmptyField { line, field: "id" });
        }
        if row.organization_id.is_empty() {
            return Err(ImportError::EmptyField {
                line,
                field: "organization_id",
            });
        }
        let subject =
            ApprovalSubject::parse(&row.subject).ok_or_else(|| ImportError::UnknownSubject {
                line,
                value: row.subject.clone(),
            })?;
        let status = if row.status.is_empty() {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::parse(&row.status).ok_or_else(|| ImportError::UnknownStatus {
                line,
                value: row.status.clone(),
            })?
        };

        let id = InstanceId(row.id);
        if !seen.insert(id.clone()) {
            return Err(ImportError::DuplicateId { line, id });
        }

        let mut record = workflow.open(
            id,
            subject,
            OrganizationId(row.organization_id),
            imported_by,
            at,
        );
        let decision = match status {
            ApprovalStatus::Pending => None,
            ApprovalStatus::Approved => Some(ApprovalDecision::Approve),
            ApprovalStatus::Rejected => Some(ApprovalDecision::Reject),
        };
        if let Some(decision) = decision {
            record.instance = workflow
                .decide_at(
                    &record.instance,
                    decision,
                    imported_by,
                    Some("imported".to_string()),
                    at,
                )
                .map_err(|source| ImportError::Workflow { line, source })?;
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::engine::ActorRole;
    use chrono::TimeZone;

    fn tpo() -> Actor {
        Actor::new("tpo-1", ActorRole::Tpo)
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 17, 0, 0).unwrap()
    }

    #[test]
    fn imports_pending_and_decided_rows() {
        let csv = "\
id,subject,status,organization_id
org-000001, Organization ,,company-1
rec-000002,recruiter,pending,company-1
org-000003,company,Approved,company-3
";
        let records = approvals_from_reader(csv.as_bytes(), &tpo(), at()).expect("valid csv");

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].subject, ApprovalSubject::Organization);
        assert_eq!(records[0].instance.current_state(), ApprovalStatus::Pending);
        assert_eq!(records[1].subject, ApprovalSubject::Recruiter);
        assert_eq!(records[2].instance.current_state(), ApprovalStatus::Approved);
        assert_eq!(records[2].instance.history().len(), 2);
        assert_eq!(records[2].instance.version(), 1);
    }

    #[test]
    fn unknown_status_reports_line() {
        let csv = "id,subject,status,organization_id\norg-1,organization,onboarded,company-1\n";
        match approvals_from_reader(csv.as_bytes(), &tpo(), at()) {
            Err(ImportError::UnknownStatus { line, value }) => {
                assert_eq!(line, 2);
                assert_eq!(value, "onboarded");
            }
            other => panic!("expected unknown status, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let csv = "id,subject,status,organization_id\n\
org-1,organization,,company-1\n\
org-1,organization,,company-1\n";
        assert!(matches!(
            approvals_from_reader(csv.as_bytes(), &tpo(), at()),
            Err(ImportError::DuplicateId { line: 3, .. })
        ));
    }

    #[test]
    fn decided_rows_require_a_reviewer() {
        let csv = "id,subject,status,organization_id\norg-1,organization,rejected,company-1\n";
        let recruiter = Actor::new("rec-1", ActorRole::Recruiter);
        match approvals_from_reader(csv.as_bytes(), &recruiter, at()) {
            Err(ImportError::Workflow { line: 2, source }) => {
                assert!(matches!(source, WorkflowError::Forbidden { .. }))
            }
            other => panic!("expected forbidden replay, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_a_csv_error() {
        let csv = "id,subject\norg-1,organization\n";
        assert!(matches!(
            approvals_from_reader(csv.as_bytes(), &tpo(), at()),
            Err(ImportError::Csv(_))
        ));
    }
}
