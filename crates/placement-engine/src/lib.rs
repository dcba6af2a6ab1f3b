pub mod config;
pub mod error;
pub mod import;
pub mod matching;
pub mod services;
pub mod telemetry;
pub mod workflows;
