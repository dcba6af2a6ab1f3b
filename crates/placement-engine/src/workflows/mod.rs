pub mod application;
pub mod approval;
pub mod bulk;
pub mod engine;

pub use application::ApplicationWorkflow;
pub use approval::ApprovalWorkflow;
pub use bulk::{apply_bulk, apply_bulk_at, BulkFailure, BulkOutcome};
