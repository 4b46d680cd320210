//! The record threaded through the pipeline and the partial updates stages return.

use crate::research::{AnalysisResult, Document, FormattedReport, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Position of a run in the linear stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Search,
    Analyze,
    Validate,
    Summarize,
    Format,
    Terminal,
}

impl PipelinePhase {
    /// The five working phases, in execution order.
    pub const STAGES: [PipelinePhase; 5] = [
        PipelinePhase::Search,
        PipelinePhase::Analyze,
        PipelinePhase::Validate,
        PipelinePhase::Summarize,
        PipelinePhase::Format,
    ];

    /// The following phase. `Terminal` is absorbing.
    pub fn next(self) -> Self {
        match self {
            PipelinePhase::Search => PipelinePhase::Analyze,
            PipelinePhase::Analyze => PipelinePhase::Validate,
            PipelinePhase::Validate => PipelinePhase::Summarize,
            PipelinePhase::Summarize => PipelinePhase::Format,
            PipelinePhase::Format | PipelinePhase::Terminal => PipelinePhase::Terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == PipelinePhase::Terminal
    }

    /// Fraction of the run completed on entering this phase.
    pub fn progress(self) -> f32 {
        match self {
            PipelinePhase::Search => 0.0,
            PipelinePhase::Analyze => 0.2,
            PipelinePhase::Validate => 0.4,
            PipelinePhase::Summarize => 0.6,
            PipelinePhase::Format => 0.8,
            PipelinePhase::Terminal => 1.0,
        }
    }
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelinePhase::Search => "search",
            PipelinePhase::Analyze => "analyze",
            PipelinePhase::Validate => "validate",
            PipelinePhase::Summarize => "summarize",
            PipelinePhase::Format => "format",
            PipelinePhase::Terminal => "terminal",
        };
        write!(f, "{name}")
    }
}

/// Accumulated state of one pipeline run.
///
/// Fields start empty and are filled in as stages complete; a field, once
/// set, is never cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub run_id: Uuid,
    pub topic: String,
    pub phase: PipelinePhase,
    #[serde(default)]
    pub documents: Option<Vec<Document>>,
    #[serde(default)]
    pub analysis: Option<AnalysisResult>,
    #[serde(default)]
    pub validation: Option<ValidationResult>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub report: Option<FormattedReport>,
    #[serde(default)]
    pub report_path: Option<PathBuf>,
    /// Phases whose output came from the recovery path.
    #[serde(default)]
    pub degraded_stages: Vec<PipelinePhase>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
    pub fn new(topic: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            topic: topic.into(),
            phase: PipelinePhase::Search,
            documents: None,
            analysis: None,
            validation: None,
            summary: None,
            report: None,
            report_path: None,
            degraded_stages: Vec::new(),
            started_at: now,
            updated_at: now,
            finished_at: None,
        }
    }

    /// Retrieved documents, empty before the search stage has run.
    pub fn documents(&self) -> &[Document] {
        self.documents.as_deref().unwrap_or_default()
    }

    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    pub fn themes(&self) -> Vec<String> {
        self.analysis
            .as_ref()
            .map(|a| a.themes.clone())
            .unwrap_or_default()
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_stages.is_empty()
    }

    /// Merge a stage's output. Fields absent from `update` are left untouched.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(documents) = update.documents {
            self.documents = Some(documents);
        }
        if let Some(analysis) = update.analysis {
            self.analysis = Some(analysis);
        }
        if let Some(validation) = update.validation {
            self.validation = Some(validation);
        }
        if let Some(summary) = update.summary {
            self.summary = Some(summary);
        }
        if let Some(report) = update.report {
            self.report = Some(report);
        }
        if let Some(path) = update.report_path {
            self.report_path = Some(path);
        }
        self.updated_at = Utc::now();
    }

    pub(crate) fn enter(&mut self, phase: PipelinePhase) {
        self.phase = phase;
        self.updated_at = Utc::now();
        if phase.is_terminal() {
            self.finished_at = Some(self.updated_at);
        }
    }
}

/// The fields one stage produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub documents: Option<Vec<Document>>,
    pub analysis: Option<AnalysisResult>,
    pub validation: Option<ValidationResult>,
    pub summary: Option<String>,
    pub report: Option<FormattedReport>,
    pub report_path: Option<PathBuf>,
}

impl StateUpdate {
    pub fn documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Some(documents),
            ..Default::default()
        }
    }

    pub fn analysis(analysis: AnalysisResult) -> Self {
        Self {
            analysis: Some(analysis),
            ..Default::default()
        }
    }

    pub fn validation(validation: ValidationResult) -> Self {
        Self {
            validation: Some(validation),
            ..Default::default()
        }
    }

    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Default::default()
        }
    }

    pub fn report(report: FormattedReport, path: Option<PathBuf>) -> Self {
        Self {
            report: Some(report),
            report_path: path,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::validation::validate_counts;

    #[test]
    fn test_phase_sequence() {
        let mut phase = PipelinePhase::Search;
        let mut seen = vec![phase];
        while !phase.is_terminal() {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(&seen[..5], &PipelinePhase::STAGES);
        assert_eq!(seen.last(), Some(&PipelinePhase::Terminal));
        assert_eq!(PipelinePhase::Terminal.next(), PipelinePhase::Terminal);
    }

    #[test]
    fn test_phase_display_and_serde() {
        assert_eq!(PipelinePhase::Summarize.to_string(), "summarize");
        assert_eq!(
            serde_json::to_string(&PipelinePhase::Format).unwrap(),
            "\"format\""
        );
    }

    #[test]
    fn test_new_state_holds_only_topic() {
        let state = WorkflowState::new("graph databases");
        assert_eq!(state.topic, "graph databases");
        assert_eq!(state.phase, PipelinePhase::Search);
        assert!(state.documents().is_empty());
        assert!(state.analysis.is_none());
        assert!(state.finished_at.is_none());
    }

    #[test]
    fn test_apply_merges_without_clearing() {
        let mut state = WorkflowState::new("t");
        state.apply(StateUpdate::documents(vec![Document::placeholder("t")]));
        state.apply(StateUpdate::validation(validate_counts(1, 0)));
        state.apply(StateUpdate::default());
        assert_eq!(state.documents().len(), 1);
        assert!(state.validation.is_some());
        assert!(state.summary.is_none());
    }

    #[test]
    fn test_enter_terminal_sets_finish_time() {
        let mut state = WorkflowState::new("t");
        state.enter(PipelinePhase::Terminal);
        assert!(state.is_terminal());
        assert!(state.finished_at.is_some());
    }

    #[test]
    fn test_state_serializes() {
        let mut state = WorkflowState::new("t");
        state.apply(StateUpdate::summary("narrative"));
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["summary"], "narrative");
        assert_eq!(json["phase"], "search");
        let back: WorkflowState = serde_json::from_value(json).unwrap();
        assert_eq!(back.summary(), "narrative");
    }
}
