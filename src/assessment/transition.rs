//! Pure assessment transition function

use super::{AssessmentState, Effect, Event};
use thiserror::Error;

/// Error annotation when the server gives no detail
pub const GENERIC_ANALYSIS_FAILURE: &str = "Analysis failed. Please try again.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: AssessmentState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: AssessmentState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Rejected events. The runtime treats every one of these as a no-op.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("No file staged")]
    NothingStaged,
    #[error("Analysis already in progress")]
    AnalysisInProgress,
    #[error("Result already available; stage a new file or reset")]
    AlreadyResolved,
    #[error("Discarding completion for stale attempt {0}")]
    StaleCompletion(u64),
}

/// Pure transition function: same inputs, same outputs, no I/O.
pub fn transition(
    state: &AssessmentState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // One upload at a time: nothing new is staged until it completes
        (
            AssessmentState::Analyzing { .. } | AssessmentState::Discarding { .. },
            Event::Stage { .. },
        ) => Err(TransitionError::AnalysisInProgress),

        (_, Event::Stage { file }) => {
            Ok(TransitionResult::new(AssessmentState::Staged { file, error: None }))
        }

        // The upload keeps running; its outcome is dropped on arrival
        (
            AssessmentState::Analyzing { attempt, .. } | AssessmentState::Discarding { attempt },
            Event::Reset,
        ) => Ok(TransitionResult::new(AssessmentState::Discarding {
            attempt: *attempt,
        })),

        (_, Event::Reset) => Ok(TransitionResult::new(AssessmentState::Idle)),

        (AssessmentState::Staged { file, .. }, Event::Analyze { attempt }) => {
            Ok(TransitionResult::new(AssessmentState::Analyzing {
                file: file.clone(),
                attempt,
            })
            .with_effect(Effect::Upload {
                file: file.clone(),
                attempt,
            }))
        }

        (AssessmentState::Idle | AssessmentState::Discarding { .. }, Event::Analyze { .. }) => {
            Err(TransitionError::NothingStaged)
        }

        (AssessmentState::Analyzing { .. }, Event::Analyze { .. }) => {
            Err(TransitionError::AnalysisInProgress)
        }

        (AssessmentState::Resolved { .. }, Event::Analyze { .. }) => {
            Err(TransitionError::AlreadyResolved)
        }

        (
            AssessmentState::Analyzing { file, attempt },
            Event::AnalysisSucceeded {
                attempt: completed,
                result,
            },
        ) if *attempt == completed => Ok(TransitionResult::new(AssessmentState::Resolved {
            file: file.clone(),
            result,
        })),

        // The file stays staged so the user can retry without re-selecting
        (
            AssessmentState::Analyzing { file, attempt },
            Event::AnalysisFailed {
                attempt: completed,
                detail,
            },
        ) if *attempt == completed => Ok(TransitionResult::new(AssessmentState::Staged {
            file: file.clone(),
            error: Some(failure_text(detail)),
        })),

        (
            AssessmentState::Discarding { attempt },
            Event::AnalysisSucceeded {
                attempt: completed, ..
            }
            | Event::AnalysisFailed {
                attempt: completed, ..
            },
        ) if *attempt == completed => Ok(TransitionResult::new(AssessmentState::Idle)),

        (_, Event::AnalysisSucceeded { attempt, .. } | Event::AnalysisFailed { attempt, .. }) => {
            Err(TransitionError::StaleCompletion(attempt))
        }
    }
}

fn failure_text(detail: Option<String>) -> String {
    detail
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| GENERIC_ANALYSIS_FAILURE.to_string())
}
