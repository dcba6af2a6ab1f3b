//! Eligibility filtering and weighted job/candidate match scoring.
//!
//! Everything here is a pure function of a [`JobPosting`] and a [`CandidateProfile`];
//! results are recomputed on demand and never cached.

mod criteria;
mod eligibility;
mod ranking;
mod scoring;

pub use criteria::{CandidateProfile, CriteriaError, EligibilityCriteria, JobId, JobPosting};
pub use eligibility::{is_eligible, unmet_criteria, UnmetCriterion};
pub use ranking::{rank_candidates, rank_scored, RankedCandidate};
pub use scoring::{
    MatchBreakdown, MatchFactor, MatchResult, MatchScorer, SubScore, BRANCH_WEIGHT, CGPA_WEIGHT,
    EXPERIENCE_WEIGHT, SKILLS_WEIGHT,
};
