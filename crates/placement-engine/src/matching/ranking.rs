use super::criteria::{CandidateProfile, JobPosting};
use super::scoring::{MatchResult, MatchScorer};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate<K> {
    pub key: K,
    pub result: MatchResult,
}

/// Order candidates for a job: eligible first, then by score descending. Ties keep their
/// input order.
pub fn rank_candidates<'a, K, I>(job: &JobPosting, candidates: I) -> Vec<RankedCandidate<K>>
where
    I: IntoIterator<Item = (K, &'a CandidateProfile)>,
{
    rank_scored(
        candidates
            .into_iter()
            .map(|(key, profile)| RankedCandidate {
                key,
                result: MatchScorer::score(job, profile),
            }),
    )
}

/// Same ordering as [`rank_candidates`] for results that were scored elsewhere, e.g. against
/// per-application criteria.
pub fn rank_scored<K, I>(scored: I) -> Vec<RankedCandidate<K>>
where
    I: IntoIterator<Item = RankedCandidate<K>>,
{
    let mut ranked: Vec<RankedCandidate<K>> = scored.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.result
            .eligible
            .cmp(&a.result.eligible)
            .then_with(|| b.result.score.cmp(&a.result.score))
    });

    ranked
}
