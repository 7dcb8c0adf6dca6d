//! Property-based tests for the assessment workflow

use super::*;
use crate::gateway::AssessmentResult;
use crate::severity::SeverityLevel;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_file() -> impl Strategy<Value = StagedFile> {
    (
        "[a-z]{1,8}",
        prop_oneof![Just("png"), Just("jpeg"), Just("webp")],
        prop::collection::vec(any::<u8>(), 1..16),
    )
        .prop_map(|(stem, ext, data)| {
            StagedFile::new(format!("{stem}.{ext}"), format!("image/{ext}"), data).unwrap()
        })
}

fn arb_severity() -> impl Strategy<Value = Option<SeverityLevel>> {
    prop_oneof![
        Just(None),
        prop::sample::select(SeverityLevel::ALL.to_vec()).prop_map(Some),
    ]
}

fn arb_result() -> impl Strategy<Value = AssessmentResult> {
    (0.0f64..=100.0, arb_severity()).prop_map(|(percentage, severity)| AssessmentResult {
        id: None,
        percentage,
        severity,
        analyzed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        image_reference: String::new(),
    })
}

fn arb_state() -> impl Strategy<Value = AssessmentState> {
    prop_oneof![
        Just(AssessmentState::Idle),
        (arb_file(), proptest::option::of("[a-z ]{1,20}"))
            .prop_map(|(file, error)| AssessmentState::Staged { file, error }),
        (arb_file(), 1u64..10).prop_map(|(file, attempt)| AssessmentState::Analyzing { file, attempt }),
        (arb_file(), arb_result()).prop_map(|(file, result)| AssessmentState::Resolved { file, result }),
        (1u64..10).prop_map(|attempt| AssessmentState::Discarding { attempt }),
    ]
}

/// Events as a user and the gateway would produce them, attempts drawn from a small range
fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_file().prop_map(|file| Event::Stage { file }),
        (1u64..10).prop_map(|attempt| Event::Analyze { attempt }),
        Just(Event::Reset),
        (1u64..10, arb_result())
            .prop_map(|(attempt, result)| Event::AnalysisSucceeded { attempt, result }),
        (1u64..10, proptest::option::of("[a-z ]{0,20}"))
            .prop_map(|(attempt, detail)| Event::AnalysisFailed { attempt, detail }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Only Staged + Analyze starts an upload, and it always lands in Analyzing
    #[test]
    fn upload_only_from_staged(state in arb_state(), event in arb_event()) {
        let was_staged = matches!(state, AssessmentState::Staged { .. });
        let is_analyze = matches!(event, Event::Analyze { .. });

        if let Ok(result) = transition(&state, event) {
            if result.effects.is_empty() {
                prop_assert!(!(was_staged && is_analyze));
            } else {
                prop_assert!(was_staged && is_analyze);
                prop_assert_eq!(result.effects.len(), 1);
                prop_assert!(result.new_state.is_analyzing());
            }
        }
    }

    /// Repeated analyze requests produce exactly one upload
    #[test]
    fn double_analyze_single_upload(file in arb_file(), repeats in 1u64..5) {
        let mut state = AssessmentState::Staged { file, error: None };
        let mut uploads = 0;
        for attempt in 1..=repeats + 1 {
            if let Ok(result) = transition(&state, Event::Analyze { attempt }) {
                uploads += result.effects.len();
                state = result.new_state;
            }
        }
        prop_assert_eq!(uploads, 1);
        prop_assert!(state.is_analyzing());
    }

    /// Completions for any attempt other than the in-flight one never change state
    #[test]
    fn stale_completions_rejected(state in arb_state(), event in arb_event()) {
        let in_flight = state.outstanding_attempt();
        let completed = match &event {
            Event::AnalysisSucceeded { attempt, .. } | Event::AnalysisFailed { attempt, .. } => Some(*attempt),
            _ => None,
        };

        if let Some(completed) = completed {
            let result = transition(&state, event);
            if in_flight == Some(completed) {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result.unwrap_err(), TransitionError::StaleCompletion(completed));
            }
        }
    }

    /// No upload starts while another is outstanding, whatever the user does meanwhile
    #[test]
    fn at_most_one_outstanding_upload(
        state in arb_state(),
        events in prop::collection::vec(arb_event(), 0..16),
    ) {
        let mut state = state;
        for event in events {
            let before = state.outstanding_attempt();
            if let Ok(result) = transition(&state, event) {
                if before.is_some() {
                    prop_assert!(result.effects.is_empty());
                }
                state = result.new_state;
            }
        }
    }

    /// A failed analysis always leaves a non-empty error and keeps the file
    #[test]
    fn failure_always_annotated(
        file in arb_file(),
        attempt in 1u64..10,
        detail in proptest::option::of("[ a-z]{0,20}"),
    ) {
        let state = AssessmentState::Analyzing { file: file.clone(), attempt };
        let result = transition(&state, Event::AnalysisFailed { attempt, detail }).unwrap();

        prop_assert_eq!(result.new_state.staged_file(), Some(&file));
        let error = result.new_state.error().unwrap();
        prop_assert!(!error.trim().is_empty());
    }

    /// Error and result are never present at the same time
    #[test]
    fn error_and_result_exclusive(state in arb_state(), events in prop::collection::vec(arb_event(), 0..12)) {
        let mut state = state;
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
            prop_assert!(!(state.error().is_some() && state.result().is_some()));
            prop_assert_eq!(state.result().is_some(), state.guidance().is_some());
        }
    }
}
