//! Severity-to-guidance mapping
//!
//! Two explicit lookup tables: the upload result screen (covers `none` through
//! `severe`, narrative-focused) and the dashboard (covers `mild` through
//! `severe`, action-list-focused). Both are total: anything they do not
//! recognize maps to [`SeverityGuidance::NEUTRAL`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Ordinal classification of an assessment result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    None,
    Mild,
    Moderate,
    Severe,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 4] = [
        SeverityLevel::None,
        SeverityLevel::Mild,
        SeverityLevel::Moderate,
        SeverityLevel::Severe,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLevel::None => "none",
            SeverityLevel::Mild => "mild",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::Severe => "severe",
        }
    }

    /// Parse a wire label. Unknown labels are absent, not errors.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserialize an optional severity label, mapping unknown labels to `None`
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<SeverityLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = Option::deserialize(deserializer)?;
    Ok(label.as_deref().and_then(SeverityLevel::parse))
}

/// Which screen the guidance is rendered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuidanceContext {
    /// Result of a fresh upload
    Upload,
    /// Dashboard and history summaries
    Dashboard,
}

/// Derived display bundle for a severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeverityGuidance {
    pub color: &'static str,
    pub recommendations: &'static [&'static str],
    pub narrative: &'static str,
}

impl SeverityGuidance {
    pub const NEUTRAL: SeverityGuidance = SeverityGuidance {
        color: "#666",
        recommendations: &[],
        narrative: "",
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

/// Guidance for a severity level in the given context
pub fn guidance_for(context: GuidanceContext, level: Option<SeverityLevel>) -> SeverityGuidance {
    let Some(level) = level else {
        return SeverityGuidance::NEUTRAL;
    };
    match context {
        GuidanceContext::Upload => upload_guidance(level),
        GuidanceContext::Dashboard => dashboard_guidance(level),
    }
}

/// Guidance for a raw wire label
pub fn guidance_for_label(context: GuidanceContext, label: &str) -> SeverityGuidance {
    guidance_for(context, SeverityLevel::parse(label))
}

fn upload_guidance(level: SeverityLevel) -> SeverityGuidance {
    match level {
        SeverityLevel::None => SeverityGuidance {
            color: "#4caf50",
            recommendations: &[
                "Keep up regular low-impact exercise",
                "Eat a balanced, anti-inflammatory diet",
                "Schedule routine check-ups",
                "Report new joint pain or stiffness early",
            ],
            narrative: "Great news! No signs of Rheumatoid Arthritis detected in your X-ray. \
                        Continue maintaining a healthy lifestyle.",
        },
        SeverityLevel::Mild => SeverityGuidance {
            color: "#ffc107",
            recommendations: &[
                "Start gentle daily stretching",
                "Add omega-3 rich foods to your meals",
                "Track morning stiffness in a journal",
                "Discuss early treatment options with your doctor",
            ],
            narrative: "Your results show mild RA indicators. Early intervention with \
                        lifestyle changes can be very effective.",
        },
        SeverityLevel::Moderate => SeverityGuidance {
            color: "#ff9800",
            recommendations: &[
                "Book a rheumatologist consultation",
                "Follow your personalized care plan",
                "Use hot/cold therapy during flare-ups",
                "Keep joints moving with low-impact exercise",
            ],
            narrative: "Your results indicate moderate RA. We recommend consulting with a \
                        rheumatologist and following our personalized care plan.",
        },
        SeverityLevel::Severe => SeverityGuidance {
            color: "#f44336",
            recommendations: &[
                "Consult a healthcare professional immediately",
                "Take prescribed medication exactly as directed",
                "Prioritize rest and joint protection",
                "Ask about physical therapy support",
            ],
            narrative: "Your results show severe RA indicators. Please consult a healthcare \
                        professional immediately for proper treatment.",
        },
    }
}

fn dashboard_guidance(level: SeverityLevel) -> SeverityGuidance {
    match level {
        // The dashboard never shows a negative result
        SeverityLevel::None => SeverityGuidance::NEUTRAL,
        SeverityLevel::Mild => SeverityGuidance {
            color: "#4caf50",
            recommendations: &[
                "🥗 Focus on anti-inflammatory foods",
                "🏃 30 minutes walking daily",
                "😴 Get 7-8 hours of sleep",
                "🧘 Practice stress management",
            ],
            narrative: "I see you have mild RA symptoms. The good news is that with proper \
                        lifestyle modifications, diet, and exercise, you can manage this \
                        condition effectively!",
        },
        SeverityLevel::Moderate => SeverityGuidance {
            color: "#ff9800",
            recommendations: &[
                "🥗 Strict Mediterranean diet",
                "🏊 Water aerobics 4-5 days/week",
                "🌡️ Use hot/cold therapy",
                "⚖️ Maintain healthy weight",
            ],
            narrative: "Your test shows moderate RA. This requires careful attention to diet, \
                        exercise, and lifestyle.",
        },
        SeverityLevel::Severe => SeverityGuidance {
            color: "#f44336",
            recommendations: &[
                "🥗 Plant-based anti-inflammatory diet",
                "🏥 Regular rheumatologist visits",
                "💊 Follow medication strictly",
                "😴 Prioritize rest (8-9 hours)",
            ],
            narrative: "Your test indicates severe RA, which requires close medical \
                        supervision. Please work closely with your rheumatologist.",
        },
    }
}
