use crate::error::ErrorKind;
use crate::workflows::engine::OrganizationId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub const MAX_CGPA: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hard admissibility criteria attached to a job. Unset fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cgpa: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_branches: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<u16>,
}

impl EligibilityCriteria {
    /// Branch restriction, if one is actually in force. An empty set means unrestricted.
    pub fn branch_restriction(&self) -> Option<&BTreeSet<String>> {
        self.allowed_branches
            .as_ref()
            .filter(|branches| !branches.is_empty())
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        if let Some(min_cgpa) = self.min_cgpa {
            if !min_cgpa.is_finite() || !(0.0..=MAX_CGPA).contains(&min_cgpa) {
                return Err(CriteriaError::CgpaOutOfRange { value: min_cgpa });
            }
        }

        if let Some(branches) = &self.allowed_branches {
            if branches.iter().any(|branch| branch.trim().is_empty()) {
                return Err(CriteriaError::BlankBranch);
            }
        }

        if self.graduation_year == Some(0) {
            return Err(CriteriaError::InvalidGraduationYear);
        }

        Ok(())
    }
}

/// A job posting as supplied by the job collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub organization_id: OrganizationId,
    pub title: String,
    #[serde(default)]
    pub criteria: EligibilityCriteria,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub experience_required: u8,
}

/// Read-only candidate snapshot supplied by the student-profile collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub cgpa: f32,
    pub branch: String,
    pub graduation_year: u16,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_years: u8,
}

/// Malformed eligibility criteria.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CriteriaError {
    #[error("minimum CGPA {value} is outside 0-10")]
    CgpaOutOfRange { value: f32 },
    #[error("allowed branches contain a blank entry")]
    BlankBranch,
    #[error("graduation year must be positive")]
    InvalidGraduationYear,
}

impl CriteriaError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidCriteria
    }
}
