//! Job application lifecycle bound to the generic workflow engine.

pub mod domain;
mod timeline;
mod workflow;

pub use domain::{ApplicationInstance, ApplicationRecord, ApplicationStatus};
pub use timeline::{status_view, timeline, ApplicationStatusView, TimelineEntry};
pub use workflow::ApplicationWorkflow;
