//! Error types for talkcal.

use thiserror::Error;

/// Errors that can occur while turning a talk into a calendar document.
#[derive(Error, Debug)]
pub enum TalkCalError {
    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("End time {end} is before start time {start}")]
    EndBeforeStart { start: String, end: String },

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TalkCalError {
    /// True for errors caused by the submitted values rather than by talkcal itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TalkCalError::InvalidTitle(_)
                | TalkCalError::InvalidTime { .. }
                | TalkCalError::EndBeforeStart { .. }
        )
    }

    pub(crate) fn invalid_time(input: &str, reason: impl Into<String>) -> Self {
        TalkCalError::InvalidTime {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for talkcal operations.
pub type TalkCalResult<T> = Result<T, TalkCalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_classified() {
        assert!(TalkCalError::InvalidTitle("".into()).is_validation());
        assert!(TalkCalError::invalid_time("x", "nope").is_validation());
        assert!(
            TalkCalError::EndBeforeStart {
                start: "a".into(),
                end: "b".into()
            }
            .is_validation()
        );
        assert!(!TalkCalError::IcsGenerate("boom".into()).is_validation());
        assert!(!TalkCalError::Config("bad zone".into()).is_validation());
    }

    #[test]
    fn test_invalid_time_message_names_input() {
        let err = TalkCalError::invalid_time("2024-13-01T10:00", "month out of range");
        assert_eq!(
            err.to_string(),
            "Invalid time '2024-13-01T10:00': month out of range"
        );
    }
}
