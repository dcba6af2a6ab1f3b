use super::actor::{Actor, ActorRole, InstanceId, Ownership, UserId};
use super::definition::{WorkflowAction, WorkflowDefinition, WorkflowState};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Who performed a recorded step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorStamp {
    pub user_id: UserId,
    pub role: ActorRole,
}

impl From<&Actor> for ActorStamp {
    fn from(actor: &Actor) -> Self {
        Self {
            user_id: actor.user_id.clone(),
            role: actor.role,
        }
    }
}

/// Append-only audit record. The creation entry has no `from_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<S> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_state: Option<S>,
    pub to_state: S,
    pub actor: ActorStamp,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One entity's progress through a workflow.
///
/// Instances are snapshots: [`super::transition`] consumes a reference and returns a new
/// instance, so the current state and history only change through validated transitions.
/// Deserialization goes through [`WorkflowInstance::restore`] and rejects snapshots whose
/// state or version disagree with their history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowInstance<S> {
    pub id: InstanceId,
    owner: Ownership,
    current_state: S,
    history: Vec<HistoryEntry<S>>,
    version: u64,
}

impl<S> WorkflowInstance<S>
where
    S: WorkflowState,
{
    /// Create an instance in the definition's initial state.
    pub fn start<A>(
        definition: &WorkflowDefinition<S, A>,
        id: InstanceId,
        owner: Ownership,
        actor: &Actor,
        at: DateTime<Utc>,
        note: Option<String>,
    ) -> Self
    where
        A: WorkflowAction<S>,
    {
        let initial = definition.initial();
        Self {
            id,
            owner,
            current_state: initial,
            history: vec![HistoryEntry {
                from_state: None,
                to_state: initial,
                actor: ActorStamp::from(actor),
                timestamp: at,
                note: normalize_note(note),
            }],
            version: 0,
        }
    }

    /// Rebuild a persisted instance. The current state is the last history entry's target;
    /// returns `None` for an empty history.
    pub fn restore(
        id: InstanceId,
        owner: Ownership,
        history: Vec<HistoryEntry<S>>,
        version: u64,
    ) -> Option<Self> {
        let current_state = history.last()?.to_state;
        Some(Self {
            id,
            owner,
            current_state,
            history,
            version,
        })
    }

    pub fn owner(&self) -> &Ownership {
        &self.owner
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    pub fn history(&self) -> &[HistoryEntry<S>] {
        &self.history
    }

    pub fn latest(&self) -> Option<&HistoryEntry<S>> {
        self.history.last()
    }

    /// Incremented once per applied transition; repositories compare it for optimistic
    /// concurrency.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn advance(mut self, entry: HistoryEntry<S>) -> Self {
        self.current_state = entry.to_state;
        self.history.push(entry);
        self.version += 1;
        self
    }
}

#[derive(Deserialize)]
struct InstanceSnapshot<S> {
    id: InstanceId,
    owner: Ownership,
    current_state: S,
    history: Vec<HistoryEntry<S>>,
    version: u64,
}

impl<'de, S> Deserialize<'de> for WorkflowInstance<S>
where
    S: WorkflowState + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let snapshot = InstanceSnapshot::<S>::deserialize(deserializer)?;
        let claimed = snapshot.current_state;
        let appended = snapshot.history.len().saturating_sub(1) as u64;
        if snapshot.version != appended {
            return Err(D::Error::custom(format!(
                "instance {} has version {} but {} recorded transitions",
                snapshot.id, snapshot.version, appended
            )));
        }

        let instance = Self::restore(
            snapshot.id,
            snapshot.owner,
            snapshot.history,
            snapshot.version,
        )
        .ok_or_else(|| D::Error::custom("workflow instance has an empty history"))?;
        if instance.current_state != claimed {
            return Err(D::Error::custom(format!(
                "instance {} claims state {} but its history ends in {}",
                instance.id,
                claimed.state_label(),
                instance.current_state.state_label()
            )));
        }
        Ok(instance)
    }
}

pub(crate) fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
