use super::actor::{Actor, ActorRole, Ownership};
use super::transition::ForbiddenReason;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// A closed set of workflow states.
pub trait WorkflowState: Copy + Eq + Hash + fmt::Debug {
    fn state_label(self) -> &'static str;
}

/// An action vocabulary entry. Every action names exactly one target state.
pub trait WorkflowAction<S>: Copy + Eq + Hash + fmt::Debug {
    fn target(self) -> S;
    fn action_label(self) -> &'static str;
}

/// Ownership check attached to a transition edge, evaluated after the role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    Unrestricted,
    SameOrganization,
    OwningApplicant,
}

impl Guard {
    pub(crate) fn check(self, actor: &Actor, owner: &Ownership) -> Result<(), ForbiddenReason> {
        match self {
            Guard::Unrestricted => Ok(()),
            Guard::SameOrganization => match (&actor.organization_id, &owner.organization_id) {
                (Some(actor_org), Some(owner_org)) if actor_org == owner_org => Ok(()),
                _ => Err(ForbiddenReason::OrganizationMismatch),
            },
            Guard::OwningApplicant => {
                if owner.applicant_id.as_ref() == Some(&actor.user_id) {
                    Ok(())
                } else {
                    Err(ForbiddenReason::NotOwningApplicant)
                }
            }
        }
    }
}

/// One edge of the transition table.
#[derive(Debug, Clone)]
pub struct TransitionRule<S, A> {
    pub from: S,
    pub action: A,
    pub roles: &'static [ActorRole],
    pub guard: Guard,
}

impl<S, A> TransitionRule<S, A>
where
    A: WorkflowAction<S>,
{
    pub fn to(&self) -> S {
        self.action.target()
    }

    pub fn permits_role(&self, role: ActorRole) -> bool {
        self.roles.contains(&role)
    }
}

/// Immutable description of a finite workflow.
#[derive(Debug, Clone)]
pub struct WorkflowDefinition<S, A> {
    name: &'static str,
    states: Vec<S>,
    initial: S,
    terminal: Vec<S>,
    rules: Vec<TransitionRule<S, A>>,
}

impl<S, A> WorkflowDefinition<S, A>
where
    S: WorkflowState,
    A: WorkflowAction<S>,
{
    pub fn new(
        name: &'static str,
        states: Vec<S>,
        initial: S,
        terminal: Vec<S>,
        rules: Vec<TransitionRule<S, A>>,
    ) -> Self {
        Self {
            name,
            states,
            initial,
            terminal,
            rules,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn initial(&self) -> S {
        self.initial
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    pub fn terminal_states(&self) -> &[S] {
        &self.terminal
    }

    pub fn is_terminal(&self, state: S) -> bool {
        self.terminal.contains(&state)
    }

    pub fn rules(&self) -> &[TransitionRule<S, A>] {
        &self.rules
    }

    pub fn rule(&self, from: S, action: A) -> Option<&TransitionRule<S, A>> {
        self.rules
            .iter()
            .find(|rule| rule.from == from && rule.action == action)
    }

    pub fn outgoing(&self, from: S) -> impl Iterator<Item = &TransitionRule<S, A>> + '_ {
        self.rules.iter().filter(move |rule| rule.from == from)
    }

    /// Check the structural invariants of the transition table.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let known: HashSet<S> = self.states.iter().copied().collect();
        let require_known = |state: S| {
            if known.contains(&state) {
                Ok(())
            } else {
                Err(DefinitionError::UnknownState {
                    state: state.state_label(),
                })
            }
        };

        require_known(self.initial)?;
        for state in &self.terminal {
            require_known(*state)?;
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            require_known(rule.from)?;
            require_known(rule.to())?;

            if self.is_terminal(rule.from) {
                return Err(DefinitionError::TerminalHasTransitions {
                    state: rule.from.state_label(),
                });
            }
            if rule.to() == self.initial {
                return Err(DefinitionError::InitialIsTarget {
                    state: self.initial.state_label(),
                });
            }
            if rule.roles.is_empty() {
                return Err(DefinitionError::NoPermittedRoles {
                    state: rule.from.state_label(),
                    action: rule.action.action_label(),
                });
            }
            if !seen.insert((rule.from, rule.action)) {
                return Err(DefinitionError::DuplicateTransition {
                    state: rule.from.state_label(),
                    action: rule.action.action_label(),
                });
            }
        }

        for state in &self.states {
            if !self.is_terminal(*state) && self.outgoing(*state).next().is_none() {
                return Err(DefinitionError::DeadEnd {
                    state: state.state_label(),
                });
            }
        }

        Ok(())
    }
}

/// Structural defects in a transition table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    #[error("state `{state}` is not declared by the workflow")]
    UnknownState { state: &'static str },
    #[error("terminal state `{state}` has outgoing transitions")]
    TerminalHasTransitions { state: &'static str },
    #[error("non-terminal state `{state}` has no outgoing transitions")]
    DeadEnd { state: &'static str },
    #[error("initial state `{state}` is the target of a transition")]
    InitialIsTarget { state: &'static str },
    #[error("transition `{action}` from `{state}` is declared more than once")]
    DuplicateTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("transition `{action}` from `{state}` permits no roles")]
    NoPermittedRoles {
        state: &'static str,
        action: &'static str,
    },
}
