use crate::infra::{read_json, DecisionArg, InMemoryAuditLog, InMemoryRepository, RoleArg};
use chrono::Utc;
use clap::Args;
use placement_engine::config::AppConfig;
use placement_engine::error::AppError;
use placement_engine::import;
use placement_engine::matching::{unmet_criteria, CandidateProfile, JobPosting, MatchScorer};
use placement_engine::services::{ApprovalService, ApprovalServiceError, InstanceRepository};
use placement_engine::workflows::approval::{ApprovalDecision, ApprovalRecord};
use placement_engine::workflows::engine::Actor;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Job posting JSON (id, organization_id, title, criteria, required_skills, ...)
    #[arg(long)]
    pub(crate) job: PathBuf,
    /// Candidate profile JSON (cgpa, branch, graduation_year, skills, experience_years)
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub(crate) pretty: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BulkApprovalArgs {
    /// Approvals export with columns id,subject,status,organization_id
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Decision applied to every record
    #[arg(long, value_enum)]
    pub(crate) decision: DecisionArg,
    /// Role of the reviewer running the batch
    #[arg(long, value_enum, default_value = "tpo")]
    pub(crate) role: RoleArg,
    /// User id recorded in each history entry
    #[arg(long, default_value = "placement-office")]
    pub(crate) user: String,
    /// Notes recorded on every successful decision
    #[arg(long)]
    pub(crate) notes: Option<String>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let job: JobPosting = read_json(&args.job)?;
    let profile: CandidateProfile = read_json(&args.profile)?;
    job.criteria.validate()?;

    let result = MatchScorer::score(&job, &profile);
    let unmet: Vec<String> = unmet_criteria(&job.criteria, &profile)
        .iter()
        .map(|criterion| criterion.summary())
        .collect();
    let output = json!({
        "job_id": job.id,
        "eligible": result.eligible,
        "score": result.score,
        "breakdown": result.breakdown,
        "unmet_criteria": unmet,
    });

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_bulk_approvals(
    args: BulkApprovalArgs,
    config: &AppConfig,
) -> Result<(), AppError> {
    let reviewer = Actor::new(args.user, args.role.into());
    let decision = ApprovalDecision::from(args.decision);
    let records = import::approvals_from_path(&args.csv, &reviewer, Utc::now())?;
    info!(path = %args.csv.display(), records = records.len(), "approvals imported");

    let repository = Arc::new(InMemoryRepository::<ApprovalRecord>::default());
    let audit = Arc::new(InMemoryAuditLog::default());
    let mut ids = Vec::with_capacity(records.len());
    for record in records {
        ids.push(record.instance.id.clone());
        repository
            .insert(record)
            .map_err(ApprovalServiceError::from)?;
    }

    let service = ApprovalService::new(repository, audit.clone(), config.bulk);
    let report = service.bulk_decide(&ids, decision, &reviewer, args.notes.as_deref())?;

    println!(
        "Bulk {} by {} ({}): {} succeeded, {} failed",
        decision.label(),
        reviewer.user_id,
        reviewer.role,
        report.succeeded.len(),
        report.failed.len()
    );
    for record in &report.succeeded {
        println!(
            "  ok    {} ({}) -> {}",
            record.instance.id,
            record.subject.label(),
            record.instance.current_state().label()
        );
    }
    for failure in &report.failed {
        let hint = failure
            .error
            .kind()
            .map(|kind| format!(" [{}]", kind.user_message()))
            .unwrap_or_default();
        println!("  skip  {}: {}{}", failure.id, failure.error, hint);
    }
    println!("{} audit events recorded", audit.recorded());
    Ok(())
}
