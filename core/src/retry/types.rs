use std::fmt;

use thiserror::Error;

use crate::driver::DriverError;
use crate::page::InteractionError;
use crate::recovery::FatalRecoveryError;

/// Outcome of one invocation of a retried operation.
#[derive(Debug)]
pub enum Attempt<T> {
    Success(T),
    /// The operation ran but did not achieve its goal (e.g. still out of stock).
    Failed,
    Error(AttemptError),
    /// Recovery gave up; the run must stop and a human has to look.
    Fatal(FatalRecoveryError),
}

impl<T> Attempt<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<T> From<InteractionError> for Attempt<T> {
    fn from(e: InteractionError) -> Self {
        match e.fatal() {
            Some(fatal) => Self::Fatal(fatal.clone()),
            None => Self::Error(AttemptError::from(e)),
        }
    }
}

/// A failed attempt, tagged with the kind used for the metrics error counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptError {
    kind: String,
    message: String,
}

impl AttemptError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AttemptError {}

impl From<DriverError> for AttemptError {
    fn from(e: DriverError) -> Self {
        Self::new(e.kind().as_str(), e.message())
    }
}

impl From<InteractionError> for AttemptError {
    fn from(e: InteractionError) -> Self {
        Self::new(e.kind(), e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("{0}")]
    Intervention(#[from] FatalRecoveryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverErrorKind;
    use std::collections::BTreeMap;
    use std::time::Duration;

    #[test]
    fn driver_errors_keep_their_kind() {
        let err = AttemptError::from(DriverError::new(DriverErrorKind::StaleElement, "gone"));
        assert_eq!(err.kind(), "StaleElement");
        assert_eq!(err.to_string(), "StaleElement: gone");
    }

    #[test]
    fn interaction_errors_with_fatal_cause_become_fatal_attempts() {
        let fatal = FatalRecoveryError {
            error_counts: BTreeMap::new(),
            elapsed: Duration::from_secs(1),
        };
        let attempt: Attempt<()> =
            InteractionError::not_found("#buy", Some(fatal.clone())).into();
        assert!(matches!(attempt, Attempt::Fatal(e) if e == fatal));

        let attempt: Attempt<()> = InteractionError::not_found("#buy", None).into();
        match attempt {
            Attempt::Error(e) => assert_eq!(e.kind(), "ElementNotFound"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
