//! X-ray assessment workflow
//!
//! Stage an image, upload it once, present the result with severity guidance.
//! Transitions are pure; the runtime performs the upload.

mod effect;
pub mod event;
mod file;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use file::{StagedFile, ValidationError};
pub use state::{AssessmentPhase, AssessmentState};
pub use transition::{transition, TransitionError, TransitionResult, GENERIC_ANALYSIS_FAILURE};
