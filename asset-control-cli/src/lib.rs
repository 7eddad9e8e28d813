//! Equipment count submission: record a count, look up the forecast for the
//! location, and post an alert to the team chat.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::WorkflowError;
pub use services::submission::{SubmissionReport, SubmissionWorkflow};
