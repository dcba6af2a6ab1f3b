use crate::config::ConfigError;
use crate::import::ImportError;
use crate::matching::CriteriaError;
use crate::services::{ApplicationServiceError, ApprovalServiceError};
use crate::telemetry::TelemetryError;
use crate::workflows::engine::WorkflowError;
use serde::Serialize;
use std::fmt;

/// Error kinds callers map to user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    IllegalTransition,
    NoOpTransition,
    Forbidden,
    InvalidCriteria,
    ConflictingState,
}

impl ErrorKind {
    pub const fn user_message(self) -> &'static str {
        match self {
            ErrorKind::IllegalTransition => {
                "this status change is not allowed from the current stage"
            }
            ErrorKind::NoOpTransition => "select a different status",
            ErrorKind::Forbidden => "you are not permitted to perform this action",
            ErrorKind::InvalidCriteria => "the job's eligibility criteria are invalid",
            ErrorKind::ConflictingState => {
                "this record was updated by someone else; reload and try again"
            }
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Import(ImportError),
    Workflow(WorkflowError),
    Criteria(CriteriaError),
    Application(ApplicationServiceError),
    Approval(ApprovalServiceError),
}

impl AppError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Workflow(err) => Some(err.kind()),
            AppError::Criteria(err) => Some(err.kind()),
            AppError::Application(err) => err.kind(),
            AppError::Approval(err) => err.kind(),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Import(_) => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "invalid json input: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Workflow(err) => write!(f, "workflow error: {}", err),
            AppError::Criteria(err) => write!(f, "invalid criteria: {}", err),
            AppError::Application(err) => write!(f, "application error: {}", err),
            AppError::Approval(err) => write!(f, "approval error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Workflow(err) => Some(err),
            AppError::Criteria(err) => Some(err),
            AppError::Application(err) => Some(err),
            AppError::Approval(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<WorkflowError> for AppError {
    fn from(value: WorkflowError) -> Self {
        Self::Workflow(value)
    }
}

impl From<CriteriaError> for AppError {
    fn from(value: CriteriaError) -> Self {
        Self::Criteria(value)
    }
}

impl From<ApplicationServiceError> for AppError {
    fn from(value: ApplicationServiceError) -> Self {
        Self::Application(value)
    }
}

impl From<ApprovalServiceError> for AppError {
    fn from(value: ApprovalServiceError) -> Self {
        Self::Approval(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_maps_to_select_different_status() {
        let err = AppError::from(WorkflowError::NoOpTransition { state: "screening" });
        assert_eq!(err.kind(), Some(ErrorKind::NoOpTransition));
        assert_eq!(
            ErrorKind::NoOpTransition.user_message(),
            "select a different status"
        );
    }

    #[test]
    fn infrastructure_errors_have_no_kind() {
        let err = AppError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert_eq!(err.kind(), None);
        assert!(err.to_string().starts_with("io error"));
    }
}
