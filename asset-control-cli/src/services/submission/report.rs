//! Stage tracking and the user-facing outcome of one submission

use crate::error::WorkflowError;
use crate::models::{Location, NotificationMessage, Submission};
use std::fmt;
use uuid::Uuid;

/// Workflow states. An early exit leaves the report at the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Recording,
    Fetching,
    Notifying,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Validating => "validating",
            Stage::Recording => "recording",
            Stage::Fetching => "fetching",
            Stage::Notifying => "notifying",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Success,
    Notice,
    Error,
}

/// One line shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageMessage {
    pub stage: Stage,
    pub level: MessageLevel,
    pub text: String,
}

/// Everything that happened to one submission
#[derive(Debug)]
pub struct SubmissionReport {
    pub id: Uuid,
    pub location: Location,
    /// Stage the workflow was in when it finished or bailed out
    pub exited_at: Stage,
    pub submission: Option<Submission>,
    pub recorded: bool,
    pub notification: Option<NotificationMessage>,
    pub notified: bool,
    pub messages: Vec<StageMessage>,
    pub errors: Vec<WorkflowError>,
}

impl SubmissionReport {
    pub fn new(id: Uuid, location: Location) -> Self {
        Self {
            id,
            location,
            exited_at: Stage::Idle,
            submission: None,
            recorded: false,
            notification: None,
            notified: false,
            messages: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Reached `Done` without any stage failing
    pub fn is_success(&self) -> bool {
        self.exited_at == Stage::Done && self.errors.is_empty()
    }

    /// The error that ended the workflow, if any
    pub fn terminal_error(&self) -> Option<&WorkflowError> {
        self.errors.last()
    }

    pub(crate) fn success(&mut self, stage: Stage, text: impl Into<String>) {
        self.push(stage, MessageLevel::Success, text.into());
    }

    pub(crate) fn notice(&mut self, stage: Stage, text: impl Into<String>) {
        self.push(stage, MessageLevel::Notice, text.into());
    }

    pub(crate) fn fail(&mut self, error: WorkflowError) {
        self.push(error.stage(), MessageLevel::Error, error.to_string());
        self.errors.push(error);
    }

    fn push(&mut self, stage: Stage, level: MessageLevel, text: String) {
        self.messages.push(StageMessage { stage, level, text });
    }
}
