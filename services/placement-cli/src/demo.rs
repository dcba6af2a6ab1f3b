use crate::infra::{
    InMemoryAuditLog, InMemoryJobCatalog, InMemoryProfileDirectory, InMemoryRepository,
};
use clap::Args;
use placement_engine::config::AppConfig;
use placement_engine::error::AppError;
use placement_engine::matching::{CandidateProfile, EligibilityCriteria, JobId, JobPosting};
use placement_engine::services::{ApplicationService, ApprovalService};
use placement_engine::workflows::application::{ApplicationRecord, ApplicationStatus};
use placement_engine::workflows::approval::{ApprovalDecision, ApprovalRecord, ApprovalSubject};
use placement_engine::workflows::engine::{Actor, ActorRole, OrganizationId, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;

const ORGANIZATION: &str = "org-initech";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Number of organizations submitted for the bulk approval portion (defaults to 5)
    #[arg(long)]
    pub(crate) organizations: Option<usize>,
    /// Skip the onboarding approval portion of the demo
    #[arg(long)]
    pub(crate) skip_approvals: bool,
}

pub(crate) fn run_demo(args: DemoArgs, config: &AppConfig) -> Result<(), AppError> {
    println!("Campus placement workflow demo");
    run_application_demo()?;

    if args.skip_approvals {
        return Ok(());
    }
    run_approval_demo(args.organizations.unwrap_or(5), config)
}

fn run_application_demo() -> Result<(), AppError> {
    let job = demo_job();
    let job_id = job.id.clone();
    let audit = Arc::new(InMemoryAuditLog::default());
    let service = ApplicationService::new(
        Arc::new(InMemoryRepository::<ApplicationRecord>::default()),
        Arc::new(InMemoryJobCatalog::with_jobs([job.clone()])),
        Arc::new(InMemoryProfileDirectory::with_profiles(demo_profiles())),
        audit.clone(),
    );

    println!("\nApplications for {} ({})", job.title, job.id);
    let mut applications = Vec::new();
    for student in ["stu-asha", "stu-ravi", "stu-meera"] {
        match service.apply(&job_id, &Actor::new(student, ActorRole::Student)) {
            Ok(record) => {
                println!("- {student}: submitted {}", record.instance.id);
                applications.push((student, record.instance.id));
            }
            Err(err) => println!("- {student}: not submitted ({err})"),
        }
    }

    let Some((student, application_id)) = applications.first().cloned() else {
        return Ok(());
    };
    let recruiter = Actor::new("rec-lee", ActorRole::Recruiter).in_organization(ORGANIZATION);
    for (status, feedback) in [
        (ApplicationStatus::Screening, "Resume matches the stack"),
        (ApplicationStatus::Shortlisted, "Strong portfolio"),
        (ApplicationStatus::Interviewed, "Technical round cleared"),
    ] {
        service.update_status(
            &application_id,
            status,
            &recruiter,
            Some(feedback.to_string()),
        )?;
    }

    let applicant = Actor::new(student, ActorRole::Student);
    if let Err(err) =
        service.update_status(&application_id, ApplicationStatus::Selected, &applicant, None)
    {
        let hint = err.kind().map(|kind| kind.user_message()).unwrap_or("");
        println!("\n{student} tried to mark themselves selected: {err} ({hint})");
    }
    service.update_status(
        &application_id,
        ApplicationStatus::Selected,
        &recruiter,
        Some("Offer letter sent".to_string()),
    )?;

    println!("\nTimeline for {application_id}");
    for entry in service.timeline(&application_id)? {
        println!(
            "- {} | {} by {}{}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.label,
            entry.actor_role,
            entry
                .feedback
                .map(|feedback| format!(": {feedback}"))
                .unwrap_or_default()
        );
    }

    println!("\nRanking");
    for (position, ranked) in service.rank_applicants(&job_id)?.iter().enumerate() {
        println!(
            "{}. {} score {} ({})",
            position + 1,
            ranked.key,
            ranked.result.score,
            if ranked.result.eligible {
                "eligible"
            } else {
                "ineligible"
            }
        );
    }
    println!("{} audit events recorded", audit.recorded());
    Ok(())
}

fn run_approval_demo(organizations: usize, config: &AppConfig) -> Result<(), AppError> {
    let audit = Arc::new(InMemoryAuditLog::default());
    let service = ApprovalService::new(
        Arc::new(InMemoryRepository::<ApprovalRecord>::default()),
        audit.clone(),
        config.bulk,
    );
    let tpo = Actor::new("tpo-office", ActorRole::Tpo);

    let mut ids = Vec::with_capacity(organizations);
    for n in 1..=organizations {
        let submitter = Actor::new(format!("rec-{n}"), ActorRole::Recruiter);
        let record = service.submit(
            ApprovalSubject::Organization,
            OrganizationId(format!("company-{n}")),
            &submitter,
        )?;
        ids.push(record.instance.id);
    }
    if let Some(first) = ids.first() {
        service.decide(
            first,
            ApprovalDecision::Approve,
            &tpo,
            Some("Verified ahead of the batch".to_string()),
        )?;
    }

    println!(
        "\nBulk approval of {} organizations ({} pending)",
        ids.len(),
        service.pending()?.len()
    );
    let report = service.bulk_decide(
        &ids,
        ApprovalDecision::Approve,
        &tpo,
        Some("Batch onboarding"),
    )?;
    println!(
        "- {} approved, {} skipped",
        report.succeeded.len(),
        report.failed.len()
    );
    for failure in &report.failed {
        println!("  {}: {}", failure.id, failure.error);
    }
    println!("{} audit events recorded", audit.recorded());
    Ok(())
}

fn demo_job() -> JobPosting {
    JobPosting {
        id: JobId("job-frontend-2025".to_string()),
        organization_id: OrganizationId(ORGANIZATION.to_string()),
        title: "Frontend Engineer".to_string(),
        criteria: EligibilityCriteria {
            min_cgpa: Some(7.5),
            allowed_branches: Some(BTreeSet::from([
                "Computer Science Engineering".to_string(),
                "Information Technology".to_string(),
            ])),
            graduation_year: Some(2025),
        },
        required_skills: vec!["JavaScript".to_string(), "React".to_string()],
        experience_required: 0,
    }
}

fn demo_profiles() -> Vec<(UserId, CandidateProfile)> {
    let profile = |cgpa: f32, branch: &str, skills: &[&str]| CandidateProfile {
        cgpa,
        branch: branch.to_string(),
        graduation_year: 2025,
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        experience_years: 0,
    };
    vec![
        (
            UserId("stu-asha".to_string()),
            profile(
                8.5,
                "Computer Science Engineering",
                &["JavaScript", "React", "Node.js"],
            ),
        ),
        (
            UserId("stu-ravi".to_string()),
            profile(6.0, "Computer Science Engineering", &["JavaScript", "React"]),
        ),
        (
            UserId("stu-meera".to_string()),
            profile(8.1, "Information Technology", &["JavaScript", "Python"]),
        ),
    ]
}
