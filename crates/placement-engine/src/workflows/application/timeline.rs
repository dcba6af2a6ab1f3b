use super::domain::{ApplicationInstance, ApplicationStatus};
use crate::workflows::engine::{ActorRole, InstanceId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Human-readable row projected from one history entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub status: ApplicationStatus,
    pub label: &'static str,
    pub description: &'static str,
    pub timestamp: DateTime<Utc>,
    pub actor_role: ActorRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Project the history log into timeline rows, oldest first.
pub fn timeline(instance: &ApplicationInstance) -> Vec<TimelineEntry> {
    instance
        .history()
        .iter()
        .map(|entry| TimelineEntry {
            status: entry.to_state,
            label: entry.to_state.display_name(),
            description: entry.to_state.description(),
            timestamp: entry.timestamp,
            actor_role: entry.actor.role,
            feedback: entry.note.clone(),
        })
        .collect()
}

/// Sanitized summary of an application's current position.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: InstanceId,
    pub status: &'static str,
    pub label: &'static str,
    pub terminal: bool,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_feedback: Option<String>,
}

pub fn status_view(instance: &ApplicationInstance) -> ApplicationStatusView {
    let status = instance.current_state();
    let latest_feedback = instance
        .history()
        .iter()
        .rev()
        .find_map(|entry| entry.note.clone());

    ApplicationStatusView {
        application_id: instance.id.clone(),
        status: status.label(),
        label: status.display_name(),
        terminal: status.is_terminal(),
        updated_at: instance.latest().map(|entry| entry.timestamp),
        latest_feedback,
    }
}
