//! Assessment workflow state types

use super::StagedFile;
use crate::gateway::AssessmentResult;
use crate::severity::{guidance_for, GuidanceContext, SeverityGuidance};
use serde::Serialize;

/// Single-assessment lifecycle
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AssessmentState {
    /// Nothing selected
    #[default]
    Idle,

    /// A file is selected; `error` is set after a failed analysis
    Staged {
        file: StagedFile,
        error: Option<String>,
    },

    /// Upload in flight for this attempt
    Analyzing { file: StagedFile, attempt: u64 },

    /// Reset while an upload was in flight. Presents as idle; the outcome of
    /// `attempt` is dropped when it arrives.
    Discarding { attempt: u64 },

    /// Analysis finished
    Resolved {
        file: StagedFile,
        result: AssessmentResult,
    },
}

/// Coarse phase, for presentation and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentPhase {
    Idle,
    Staged,
    Analyzing,
    Resolved,
}

impl AssessmentState {
    pub fn phase(&self) -> AssessmentPhase {
        match self {
            AssessmentState::Idle | AssessmentState::Discarding { .. } => AssessmentPhase::Idle,
            AssessmentState::Staged { .. } => AssessmentPhase::Staged,
            AssessmentState::Analyzing { .. } => AssessmentPhase::Analyzing,
            AssessmentState::Resolved { .. } => AssessmentPhase::Resolved,
        }
    }

    pub fn staged_file(&self) -> Option<&StagedFile> {
        match self {
            AssessmentState::Idle | AssessmentState::Discarding { .. } => None,
            AssessmentState::Staged { file, .. }
            | AssessmentState::Analyzing { file, .. }
            | AssessmentState::Resolved { file, .. } => Some(file),
        }
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        match self {
            AssessmentState::Resolved { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AssessmentState::Staged { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self, AssessmentState::Analyzing { .. })
    }

    /// Attempt whose upload has not completed yet, shown or not
    pub fn outstanding_attempt(&self) -> Option<u64> {
        match self {
            AssessmentState::Analyzing { attempt, .. } | AssessmentState::Discarding { attempt } => {
                Some(*attempt)
            }
            _ => None,
        }
    }

    /// Upload-screen guidance for a resolved result
    pub fn guidance(&self) -> Option<SeverityGuidance> {
        self.result()
            .map(|result| guidance_for(GuidanceContext::Upload, result.severity))
    }
}
