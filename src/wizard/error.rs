use thiserror::Error;

use crate::api::ApiError;
use crate::wizard::Step;

/// Why a wizard transition or submission was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Submission is only possible from the summary step (currently on {0})")]
    NotOnSummary(Step),

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Request is incomplete; missing: {}", join_fields(.0))]
    Incomplete(Vec<&'static str>),

    #[error("Options for the {0} step are not available yet")]
    ResourcesUnavailable(Step),

    #[error("The {0} step has invalid fields")]
    Validation(Step),

    #[error("The {0} step was edited and must be validated again")]
    Unvalidated(Step),

    #[error("Complete the earlier steps before opening {0}")]
    NavigationBlocked(Step),

    #[error("Too many failed attempts; review your choices before trying again")]
    RetryLimitReached,

    #[error(transparent)]
    Submission(#[from] ApiError),
}

fn join_fields(fields: &[&'static str]) -> String {
    fields.join(", ")
}
