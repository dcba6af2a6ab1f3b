use crate::workflows::engine::{WorkflowAction, WorkflowInstance, WorkflowState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pending, Self::Approved, Self::Rejected]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
    }
}

impl WorkflowState for ApprovalStatus {
    fn state_label(self) -> &'static str {
        self.label()
    }
}

/// Decision a placement officer or admin records on a pending entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approve,
    Reject,
}

impl ApprovalDecision {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl WorkflowAction<ApprovalStatus> for ApprovalDecision {
    fn target(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }

    fn action_label(self) -> &'static str {
        self.label()
    }
}

/// What kind of entity is awaiting onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalSubject {
    Organization,
    Recruiter,
}

impl ApprovalSubject {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Recruiter => "recruiter",
        }
    }

    pub(crate) const fn id_prefix(self) -> &'static str {
        match self {
            Self::Organization => "org",
            Self::Recruiter => "rec",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "organization" | "organisation" | "company" => Some(Self::Organization),
            "recruiter" => Some(Self::Recruiter),
            _ => None,
        }
    }
}

pub type ApprovalInstance = WorkflowInstance<ApprovalStatus>;

/// Persisted approval: the workflow instance and the kind of entity it gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub subject: ApprovalSubject,
    pub instance: ApprovalInstance,
}
