use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    #[error("Unsupported frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

impl RecurrenceError {
    pub(crate) fn rule(msg: impl Into<String>) -> Self {
        RecurrenceError::InvalidRule(msg.into())
    }
}
