//! Events that drive the assessment workflow

use super::StagedFile;
use crate::gateway::AssessmentResult;

#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Stage { file: StagedFile },
    Analyze { attempt: u64 },
    Reset,

    // Gateway events
    AnalysisSucceeded {
        attempt: u64,
        result: AssessmentResult,
    },
    AnalysisFailed {
        attempt: u64,
        /// Server-supplied detail, if any
        detail: Option<String>,
    },
}
