//! Error taxonomy for one submission attempt

use crate::config::ConfigError;
use crate::models::Location;
use crate::services::submission::Stage;
use std::fmt;

/// Form field that must be non-zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Bag,
    SmallCage,
}

impl RequiredField {
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::Bag => "BAG",
            RequiredField::SmallCage => "SMALL CAGE",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal failure of a submission. Every variant belongs to exactly one stage.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{field} is required. Please enter a value.")]
    Validation { field: RequiredField },

    #[error("Failed to log data: {0}")]
    Recording(String),

    #[error("Failed to fetch forecast data: {0}")]
    Fetch(String),

    #[error("No data found for the selected location ({location}).")]
    NoMatch { location: Location },

    #[error("Failed to send alert: {0}")]
    Notify(String),
}

impl WorkflowError {
    /// Stage at which this error ends the submission
    pub fn stage(&self) -> Stage {
        match self {
            WorkflowError::Configuration(_) => Stage::Idle,
            WorkflowError::Validation { .. } => Stage::Validating,
            WorkflowError::Recording(_) => Stage::Recording,
            WorkflowError::Fetch(_) | WorkflowError::NoMatch { .. } => Stage::Fetching,
            WorkflowError::Notify(_) => Stage::Notifying,
        }
    }
}

impl From<ConfigError> for WorkflowError {
    fn from(err: ConfigError) -> Self {
        WorkflowError::Configuration(err.to_string())
    }
}
