use super::*;
use chrono::{TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Ticket {
    Open,
    Triaged,
    Closed,
}

impl WorkflowState for Ticket {
    fn state_label(self) -> &'static str {
        match self {
            Ticket::Open => "open",
            Ticket::Triaged => "triaged",
            Ticket::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TicketAction {
    Reopen,
    Triage,
    Close,
}

impl WorkflowAction<Ticket> for TicketAction {
    fn target(self) -> Ticket {
        match self {
            TicketAction::Reopen => Ticket::Open,
            TicketAction::Triage => Ticket::Triaged,
            TicketAction::Close => Ticket::Closed,
        }
    }

    fn action_label(self) -> &'static str {
        match self {
            TicketAction::Reopen => "reopen",
            TicketAction::Triage => "triage",
            TicketAction::Close => "close",
        }
    }
}

const STAFF: &[ActorRole] = &[ActorRole::Recruiter, ActorRole::Admin];
const OWNER: &[ActorRole] = &[ActorRole::Student];

fn rule(
    from: Ticket,
    action: TicketAction,
    roles: &'static [ActorRole],
    guard: Guard,
) -> TransitionRule<Ticket, TicketAction> {
    TransitionRule {
        from,
        action,
        roles,
        guard,
    }
}

fn ticket_workflow() -> WorkflowDefinition<Ticket, TicketAction> {
    WorkflowDefinition::new(
        "ticket",
        vec![Ticket::Open, Ticket::Triaged, Ticket::Closed],
        Ticket::Open,
        vec![Ticket::Closed],
        vec![
            rule(Ticket::Open, TicketAction::Triage, STAFF, Guard::SameOrganization),
            rule(Ticket::Open, TicketAction::Close, OWNER, Guard::OwningApplicant),
            rule(Ticket::Triaged, TicketAction::Close, STAFF, Guard::Unrestricted),
        ],
    )
}

fn owner() -> Ownership {
    Ownership::application(
        OrganizationId("org-acme".to_string()),
        UserId("stu-1".to_string()),
    )
}

fn opened() -> WorkflowInstance<Ticket> {
    WorkflowInstance::start(
        &ticket_workflow(),
        InstanceId("t-1".to_string()),
        owner(),
        &Actor::new("stu-1", ActorRole::Student),
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
        None,
    )
}

fn recruiter() -> Actor {
    Actor::new("rec-1", ActorRole::Recruiter).in_organization("org-acme")
}

#[test]
fn ticket_definition_is_valid() {
    assert_eq!(ticket_workflow().validate(), Ok(()));
}

#[test]
fn validate_rejects_terminal_state_with_outgoing_edge() {
    let mut rules = ticket_workflow().rules().to_vec();
    rules.push(rule(Ticket::Closed, TicketAction::Triage, STAFF, Guard::Unrestricted));
    let definition = WorkflowDefinition::new(
        "ticket",
        vec![Ticket::Open, Ticket::Triaged, Ticket::Closed],
        Ticket::Open,
        vec![Ticket::Closed],
        rules,
    );

    assert_eq!(
        definition.validate(),
        Err(DefinitionError::TerminalHasTransitions { state: "closed" })
    );
}

#[test]
fn validate_rejects_edges_into_initial_state() {
    let mut rules = ticket_workflow().rules().to_vec();
    rules.push(rule(Ticket::Triaged, TicketAction::Reopen, STAFF, Guard::Unrestricted));
    let definition = WorkflowDefinition::new(
        "ticket",
        vec![Ticket::Open, Ticket::Triaged, Ticket::Closed],
        Ticket::Open,
        vec![Ticket::Closed],
        rules,
    );

    assert_eq!(
        definition.validate(),
        Err(DefinitionError::InitialIsTarget { state: "open" })
    );
}

#[test]
fn validate_rejects_dead_end_states() {
    let definition = WorkflowDefinition::new(
        "ticket",
        vec![Ticket::Open, Ticket::Triaged, Ticket::Closed],
        Ticket::Open,
        vec![Ticket::Closed],
        vec![rule(Ticket::Open, TicketAction::Triage, STAFF, Guard::Unrestricted)],
    );

    assert_eq!(
        definition.validate(),
        Err(DefinitionError::DeadEnd { state: "triaged" })
    );
}

#[test]
fn validate_rejects_duplicate_edges() {
    let mut rules = ticket_workflow().rules().to_vec();
    rules.push(rule(Ticket::Open, TicketAction::Triage, OWNER, Guard::Unrestricted));
    let definition = WorkflowDefinition::new(
        "ticket",
        vec![Ticket::Open, Ticket::Triaged, Ticket::Closed],
        Ticket::Open,
        vec![Ticket::Closed],
        rules,
    );

    assert_eq!(
        definition.validate(),
        Err(DefinitionError::DuplicateTransition {
            state: "open",
            action: "triage"
        })
    );
}

#[test]
fn start_records_creation_entry() {
    let instance = opened();

    assert_eq!(instance.current_state(), Ticket::Open);
    assert_eq!(instance.version(), 0);
    assert_eq!(instance.history().len(), 1);
    assert_eq!(instance.history()[0].from_state, None);
    assert_eq!(instance.history()[0].actor.role, ActorRole::Student);
}

#[test]
fn transition_appends_exactly_one_entry() {
    let definition = ticket_workflow();
    let instance = opened();
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 10, 30, 0).unwrap();

    let triaged = transition_at(
        &definition,
        &instance,
        TicketAction::Triage,
        &recruiter(),
        Some("  looks valid ".to_string()),
        at,
    )
    .expect("recruiter can triage");

    assert_eq!(triaged.current_state(), Ticket::Triaged);
    assert_eq!(triaged.version(), 1);
    assert_eq!(triaged.history().len(), instance.history().len() + 1);
    assert_eq!(triaged.history()[0], instance.history()[0]);
    let entry = triaged.latest().expect("entry appended");
    assert_eq!(entry.from_state, Some(Ticket::Open));
    assert_eq!(entry.to_state, Ticket::Triaged);
    assert_eq!(entry.timestamp, at);
    assert_eq!(entry.note.as_deref(), Some("looks valid"));

    assert_eq!(instance.current_state(), Ticket::Open, "input snapshot untouched");
}

#[test]
fn blank_notes_are_dropped() {
    let triaged = transition(
        &ticket_workflow(),
        &opened(),
        TicketAction::Triage,
        &recruiter(),
        Some("   ".to_string()),
    )
    .expect("recruiter can triage");

    assert_eq!(triaged.latest().and_then(|entry| entry.note.clone()), None);
}

#[test]
fn target_equal_to_current_is_a_noop() {
    let definition = ticket_workflow();
    let triaged = transition(&definition, &opened(), TicketAction::Triage, &recruiter(), None)
        .expect("triage");

    let err = transition(&definition, &triaged, TicketAction::Triage, &recruiter(), None)
        .expect_err("already triaged");
    assert_eq!(err, WorkflowError::NoOpTransition { state: "triaged" });
}

#[test]
fn noop_is_checked_before_edge_lookup() {
    let err = transition(
        &ticket_workflow(),
        &opened(),
        TicketAction::Reopen,
        &recruiter(),
        None,
    )
    .expect_err("open has no reopen edge");

    // reopen targets `open`, which is the current state
    assert_eq!(err, WorkflowError::NoOpTransition { state: "open" });

    let definition = ticket_workflow();
    let closed = transition(
        &definition,
        &transition(&definition, &opened(), TicketAction::Triage, &recruiter(), None)
            .expect("triage"),
        TicketAction::Close,
        &recruiter(),
        None,
    )
    .expect("close");
    let err = transition(&definition, &closed, TicketAction::Triage, &recruiter(), None)
        .expect_err("closed is terminal");
    assert_eq!(
        err,
        WorkflowError::IllegalTransition {
            state: "closed",
            action: "triage"
        }
    );
}

#[test]
fn role_outside_edge_is_forbidden() {
    let student = Actor::new("stu-1", ActorRole::Student).in_organization("org-acme");

    let err = transition(&ticket_workflow(), &opened(), TicketAction::Triage, &student, None)
        .expect_err("students cannot triage");

    assert_eq!(
        err,
        WorkflowError::Forbidden {
            role: ActorRole::Student,
            state: "open",
            action: "triage",
            reason: ForbiddenReason::RoleNotPermitted,
        }
    );
    assert_eq!(err.kind(), crate::error::ErrorKind::Forbidden);
}

#[test]
fn guards_check_organization_and_applicant() {
    let outsider = Actor::new("rec-9", ActorRole::Recruiter).in_organization("org-other");
    match transition(&ticket_workflow(), &opened(), TicketAction::Triage, &outsider, None) {
        Err(WorkflowError::Forbidden {
            reason: ForbiddenReason::OrganizationMismatch,
            ..
        }) => {}
        other => panic!("expected organization mismatch, got {other:?}"),
    }

    let other_student = Actor::new("stu-2", ActorRole::Student);
    match transition(&ticket_workflow(), &opened(), TicketAction::Close, &other_student, None) {
        Err(WorkflowError::Forbidden {
            reason: ForbiddenReason::NotOwningApplicant,
            ..
        }) => {}
        other => panic!("expected applicant mismatch, got {other:?}"),
    }
}

#[test]
fn available_actions_respect_roles_and_guards() {
    let definition = ticket_workflow();
    let instance = opened();

    assert_eq!(
        available_actions(&definition, &instance, &recruiter()),
        vec![TicketAction::Triage]
    );
    assert_eq!(
        available_actions(
            &definition,
            &instance,
            &Actor::new("stu-1", ActorRole::Student)
        ),
        vec![TicketAction::Close]
    );
    assert!(available_actions(
        &definition,
        &instance,
        &Actor::new("stu-2", ActorRole::Student)
    )
    .is_empty());
}

#[test]
fn restore_takes_state_from_last_entry() {
    let definition = ticket_workflow();
    let triaged = transition(&definition, &opened(), TicketAction::Triage, &recruiter(), None)
        .expect("triage");

    let restored = WorkflowInstance::restore(
        triaged.id.clone(),
        triaged.owner().clone(),
        triaged.history().to_vec(),
        triaged.version(),
    )
    .expect("non-empty history");
    assert_eq!(restored, triaged);

    assert!(WorkflowInstance::<Ticket>::restore(
        InstanceId("empty".to_string()),
        Ownership::default(),
        Vec::new(),
        0
    )
    .is_none());
}
