//! Onboarding approval for organizations and recruiters.

pub mod domain;
mod workflow;

pub use domain::{
    ApprovalDecision, ApprovalInstance, ApprovalRecord, ApprovalStatus, ApprovalSubject,
};
pub use workflow::ApprovalWorkflow;
