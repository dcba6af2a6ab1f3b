use super::criteria::{CandidateProfile, JobPosting};
use super::eligibility::{is_eligible, meets_branch, meets_cgpa};
use serde::{Deserialize, Serialize};

pub const SKILLS_WEIGHT: f32 = 40.0;
pub const CGPA_WEIGHT: f32 = 30.0;
pub const BRANCH_WEIGHT: f32 = 20.0;
pub const EXPERIENCE_WEIGHT: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    Skills,
    Cgpa,
    Branch,
    Experience,
}

/// Points earned out of the factor's weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub earned: f32,
    pub weight: f32,
}

impl SubScore {
    fn full(weight: f32) -> Self {
        Self {
            earned: weight,
            weight,
        }
    }

    fn none(weight: f32) -> Self {
        Self {
            earned: 0.0,
            weight,
        }
    }

    fn pass_fail(passed: bool, weight: f32) -> Self {
        if passed {
            Self::full(weight)
        } else {
            Self::none(weight)
        }
    }
}

/// Per-factor contributions. `None` means the factor does not apply to the job and its
/// weight is left out of the denominator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub skills: Option<SubScore>,
    pub cgpa: Option<SubScore>,
    pub branch: Option<SubScore>,
    pub experience: SubScore,
}

impl MatchBreakdown {
    pub fn components(&self) -> Vec<(MatchFactor, SubScore)> {
        let mut components = Vec::with_capacity(4);
        if let Some(skills) = self.skills {
            components.push((MatchFactor::Skills, skills));
        }
        if let Some(cgpa) = self.cgpa {
            components.push((MatchFactor::Cgpa, cgpa));
        }
        if let Some(branch) = self.branch {
            components.push((MatchFactor::Branch, branch));
        }
        components.push((MatchFactor::Experience, self.experience));
        components
    }

    pub fn earned(&self) -> f32 {
        self.components().iter().map(|(_, score)| score.earned).sum()
    }

    pub fn max_score(&self) -> f32 {
        self.components().iter().map(|(_, score)| score.weight).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub eligible: bool,
    pub score: u8,
    pub breakdown: MatchBreakdown,
}

/// Stateless scorer combining eligibility with the weighted fit signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchScorer;

impl MatchScorer {
    pub fn score(job: &JobPosting, profile: &CandidateProfile) -> MatchResult {
        let criteria = &job.criteria;

        let breakdown = MatchBreakdown {
            skills: skills_score(&job.required_skills, &profile.skills),
            cgpa: criteria
                .min_cgpa
                .map(|_| SubScore::pass_fail(meets_cgpa(criteria, profile), CGPA_WEIGHT)),
            branch: criteria
                .branch_restriction()
                .map(|_| SubScore::pass_fail(meets_branch(criteria, profile), BRANCH_WEIGHT)),
            experience: SubScore::pass_fail(job.experience_required == 0, EXPERIENCE_WEIGHT),
        };

        MatchResult {
            eligible: is_eligible(criteria, profile),
            score: percentage(breakdown.earned(), breakdown.max_score()),
            breakdown,
        }
    }
}

/// A required skill matches when any candidate skill contains it, ignoring case.
fn skills_score(required: &[String], candidate: &[String]) -> Option<SubScore> {
    let required = normalized(required);
    if required.is_empty() {
        return None;
    }

    let candidate = normalized(candidate);
    let matched = required
        .iter()
        .filter(|skill| candidate.iter().any(|owned| owned.contains(skill.as_str())))
        .count();

    Some(SubScore {
        earned: matched as f32 / required.len() as f32 * SKILLS_WEIGHT,
        weight: SKILLS_WEIGHT,
    })
}

fn normalized(skills: &[String]) -> Vec<String> {
    skills
        .iter()
        .map(|skill| skill.trim().to_lowercase())
        .filter(|skill| !skill.is_empty())
        .collect()
}

pub(super) fn percentage(earned: f32, max_score: f32) -> u8 {
    if max_score <= 0.0 || !earned.is_finite() {
        return 0;
    }

    let percent = (f64::from(earned) / f64::from(max_score) * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}
