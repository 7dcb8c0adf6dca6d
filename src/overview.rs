//! Read-only dashboard and history views
//!
//! Both loaders absorb gateway failures: a failed fetch is logged and shown as
//! "no data yet", never as an error.

use crate::gateway::{AssessmentResult, RemoteGateway};
use crate::severity::{guidance_for, GuidanceContext, SeverityGuidance, SeverityLevel};
use serde::Serialize;

/// One past assessment with its dashboard guidance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentSummary {
    pub result: AssessmentResult,
    pub guidance: SeverityGuidance,
}

impl AssessmentSummary {
    pub fn new(result: AssessmentResult) -> Self {
        let guidance = guidance_for(GuidanceContext::Dashboard, result.severity);
        Self { result, guidance }
    }

    /// Percentage with one decimal, e.g. `62.0%`
    pub fn score_label(&self) -> String {
        format!("{:.1}%", self.result.percentage)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardView {
    /// `None` until the user has an assessment
    pub latest: Option<AssessmentSummary>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub latest_score: Option<f64>,
    pub current_severity: Option<SeverityLevel>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HistoryView {
    /// Newest first
    pub entries: Vec<AssessmentSummary>,
    pub stats: HistoryStats,
}

impl HistoryView {
    pub fn from_results(results: Vec<AssessmentResult>) -> Self {
        let entries: Vec<_> = results.into_iter().map(AssessmentSummary::new).collect();
        let newest = entries.first().map(|entry| &entry.result);
        let stats = HistoryStats {
            total: entries.len(),
            latest_score: newest.map(|r| r.percentage),
            current_severity: newest.and_then(|r| r.severity),
        };
        Self { entries, stats }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub async fn load_dashboard<G: RemoteGateway + ?Sized>(gateway: &G) -> DashboardView {
    match gateway.latest_assessment().await {
        Ok(latest) => DashboardView {
            latest: latest.map(AssessmentSummary::new),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Latest assessment unavailable");
            DashboardView::default()
        }
    }
}

pub async fn load_history<G: RemoteGateway + ?Sized>(gateway: &G, limit: usize) -> HistoryView {
    match gateway.assessment_history(limit).await {
        Ok(results) => HistoryView::from_results(results),
        Err(e) => {
            tracing::warn!(error = %e, limit, "Assessment history unavailable");
            HistoryView::default()
        }
    }
}
