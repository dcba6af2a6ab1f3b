use super::criteria::{CandidateProfile, EligibilityCriteria};
use serde::{Deserialize, Serialize};

/// A criterion the candidate failed, for caller-side messaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnmetCriterion {
    Cgpa { required: f32, actual: f32 },
    Branch { branch: String },
    GraduationYear { required: u16, actual: u16 },
}

impl UnmetCriterion {
    pub fn summary(&self) -> String {
        match self {
            UnmetCriterion::Cgpa { required, actual } => {
                format!("CGPA {actual:.2} below required {required:.2}")
            }
            UnmetCriterion::Branch { branch } => {
                format!("branch {branch} is not eligible for this job")
            }
            UnmetCriterion::GraduationYear { required, actual } => {
                format!("graduation year {actual} does not match required {required}")
            }
        }
    }
}

/// Whether the candidate meets every hard criterion of the job.
pub fn is_eligible(criteria: &EligibilityCriteria, profile: &CandidateProfile) -> bool {
    meets_cgpa(criteria, profile)
        && meets_branch(criteria, profile)
        && meets_year(criteria, profile)
}

/// Every failed criterion, in a fixed order (CGPA, branch, graduation year).
pub fn unmet_criteria(
    criteria: &EligibilityCriteria,
    profile: &CandidateProfile,
) -> Vec<UnmetCriterion> {
    let mut unmet = Vec::new();

    if let Some(required) = criteria.min_cgpa.filter(|_| !meets_cgpa(criteria, profile)) {
        unmet.push(UnmetCriterion::Cgpa {
            required,
            actual: profile.cgpa,
        });
    }

    if !meets_branch(criteria, profile) {
        unmet.push(UnmetCriterion::Branch {
            branch: profile.branch.clone(),
        });
    }

    if let Some(required) = criteria
        .graduation_year
        .filter(|_| !meets_year(criteria, profile))
    {
        unmet.push(UnmetCriterion::GraduationYear {
            required,
            actual: profile.graduation_year,
        });
    }

    unmet
}

pub(crate) fn meets_cgpa(criteria: &EligibilityCriteria, profile: &CandidateProfile) -> bool {
    criteria
        .min_cgpa
        .map_or(true, |min_cgpa| profile.cgpa >= min_cgpa)
}

pub(crate) fn meets_branch(criteria: &EligibilityCriteria, profile: &CandidateProfile) -> bool {
    criteria
        .branch_restriction()
        .map_or(true, |branches| branches.contains(&profile.branch))
}

fn meets_year(criteria: &EligibilityCriteria, profile: &CandidateProfile) -> bool {
    criteria
        .graduation_year
        .map_or(true, |year| profile.graduation_year == year)
}
