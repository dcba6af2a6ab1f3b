use crate::matching::{EligibilityCriteria, JobId};
use crate::workflows::engine::{WorkflowAction, WorkflowInstance, WorkflowState};
use serde::{Deserialize, Serialize};

/// Recruitment stage of an application. Status values double as actions: a transition
/// request names the status the caller wants to move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Shortlisted,
    Interviewed,
    Selected,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Applied,
            Self::Screening,
            Self::Shortlisted,
            Self::Interviewed,
            Self::Selected,
            Self::Rejected,
            Self::Withdrawn,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Screening => "screening",
            Self::Shortlisted => "shortlisted",
            Self::Interviewed => "interviewed",
            Self::Selected => "selected",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Screening => "Under Screening",
            Self::Shortlisted => "Shortlisted",
            Self::Interviewed => "Interviewed",
            Self::Selected => "Selected",
            Self::Rejected => "Not Selected",
            Self::Withdrawn => "Withdrawn",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Applied => "Application submitted and awaiting recruiter review.",
            Self::Screening => "Recruiter is screening the application against the job criteria.",
            Self::Shortlisted => "Candidate shortlisted for the interview round.",
            Self::Interviewed => "Interview completed; awaiting the final decision.",
            Self::Selected => "Candidate selected for the position.",
            Self::Rejected => "Application closed without an offer.",
            Self::Withdrawn => "Candidate withdrew the application.",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Selected | Self::Rejected | Self::Withdrawn)
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|status| status.label() == normalized)
    }
}

impl WorkflowState for ApplicationStatus {
    fn state_label(self) -> &'static str {
        self.label()
    }
}

impl WorkflowAction<ApplicationStatus> for ApplicationStatus {
    fn target(self) -> ApplicationStatus {
        self
    }

    fn action_label(self) -> &'static str {
        self.label()
    }
}

pub type ApplicationInstance = WorkflowInstance<ApplicationStatus>;

/// Persisted application: the workflow instance plus the job it targets.
///
/// `criteria` is the job's eligibility criteria as they stood when the application was
/// accepted. Later edits to the job never re-evaluate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub job_id: JobId,
    pub criteria: EligibilityCriteria,
    pub instance: ApplicationInstance,
}
