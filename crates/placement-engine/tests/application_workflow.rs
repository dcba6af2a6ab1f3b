use chrono::{Duration, TimeZone, Utc};
use placement_engine::error::ErrorKind;
use placement_engine::matching::{
    is_eligible, CandidateProfile, EligibilityCriteria, JobId, JobPosting, MatchScorer,
};
use placement_engine::workflows::application::{timeline, ApplicationStatus};
use placement_engine::workflows::engine::{Actor, ActorRole, InstanceId, OrganizationId};
use placement_engine::workflows::ApplicationWorkflow;
use std::collections::BTreeSet;

fn job() -> JobPosting {
    JobPosting {
        id: JobId("job-frontend".to_string()),
        organization_id: OrganizationId("org-initech".to_string()),
        title: "Frontend Engineer".to_string(),
        criteria: EligibilityCriteria {
            min_cgpa: Some(7.5),
            allowed_branches: Some(BTreeSet::from([
                "Computer Science Engineering".to_string()
            ])),
            graduation_year: None,
        },
        required_skills: vec!["JavaScript".to_string(), "React".to_string()],
        experience_required: 0,
    }
}

fn candidate(cgpa: f32) -> CandidateProfile {
    CandidateProfile {
        cgpa,
        branch: "Computer Science Engineering".to_string(),
        graduation_year: 2025,
        skills: vec![
            "JavaScript".to_string(),
            "React".to_string(),
            "Node.js".to_string(),
        ],
        experience_years: 0,
    }
}

#[test]
fn eligible_candidate_moves_from_application_to_offer() {
    let job = job();
    let profile = candidate(8.5);
    assert!(is_eligible(&job.criteria, &profile));
    assert_eq!(MatchScorer::score(&job, &profile).score, 100);

    let workflow = ApplicationWorkflow::standard();
    let student = Actor::new("stu-1", ActorRole::Student);
    let recruiter = Actor::new("rec-1", ActorRole::Recruiter).in_organization("org-initech");
    let tpo = Actor::new("tpo-1", ActorRole::Tpo).in_organization("org-initech");
    let applied_at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 30, 0).unwrap();

    let mut application = workflow.open(
        InstanceId("app-000001".to_string()),
        &student,
        job.organization_id.clone(),
        applied_at,
    );
    let steps = [
        (ApplicationStatus::Screening, &recruiter, "Resume reviewed"),
        (ApplicationStatus::Shortlisted, &recruiter, "Shortlisted for panel"),
        (ApplicationStatus::Interviewed, &tpo, "Panel completed"),
        (ApplicationStatus::Selected, &recruiter, "Offer extended"),
    ];
    for (day, (status, actor, note)) in steps.into_iter().enumerate() {
        application = workflow
            .update_status_at(
                &application,
                status,
                actor,
                Some(note.to_string()),
                applied_at + Duration::days(day as i64 + 1),
            )
            .expect("legal move");
    }

    let rows = timeline(&application);
    assert_eq!(rows.len(), 5);
    assert!(rows.windows(2).all(|pair| pair[0].timestamp < pair[1].timestamp));
    assert_eq!(rows[4].status, ApplicationStatus::Selected);
    assert_eq!(rows[4].feedback.as_deref(), Some("Offer extended"));

    for status in ApplicationStatus::ordered() {
        let err = workflow
            .update_status(&application, status, &recruiter, None)
            .expect_err("selected is terminal");
        let expected = if status == ApplicationStatus::Selected {
            ErrorKind::NoOpTransition
        } else {
            ErrorKind::IllegalTransition
        };
        assert_eq!(err.kind(), expected);
    }
}

#[test]
fn low_cgpa_candidate_is_ineligible_but_still_scored() {
    let job = job();
    let profile = candidate(6.0);

    let result = MatchScorer::score(&job, &profile);

    assert!(!result.eligible);
    assert_eq!(result.breakdown.cgpa.map(|sub| sub.earned), Some(0.0));
    assert_eq!(result.score, 70);
}
